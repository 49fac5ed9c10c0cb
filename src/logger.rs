use slog::Drain;
use slog_atomic::{AtomicSwitch, AtomicSwitchCtrl};
use slog_term::{CompactFormat, TermDecorator};
use std::io;
use std::sync::Mutex;

use slog::*;

use crate::helpers::datetime;

pub const DEFAULT_LOG_LEVEL: u8 = 3;

type TermDrain = Fuse<Mutex<Fuse<LevelFilter<CompactFormat<TermDecorator>>>>>;

pub struct Logger {
    log_level: Mutex<u8>,
    logger: slog::Logger,
    ctrl: AtomicSwitchCtrl,
}

fn new_drain(level: Level) -> TermDrain {
    // Log to stderr, stdout is reserved for the tx/receipt output
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator)
        .use_custom_timestamp(|w: &mut dyn io::Write| write!(w, "{}", datetime::now()))
        .build()
        .filter_level(level)
        .fuse();
    Mutex::new(drain).fuse()
}

pub fn level_from_u8(log_level: u8) -> Level {
    match log_level {
        0 => Level::Critical,
        1 => Level::Error,
        2 => Level::Warning,
        3 => Level::Info,
        4 => Level::Debug,
        5 => Level::Trace,
        // Anything above is as verbose as it gets
        _ => Level::Trace,
    }
}

fn drain_from_log_level(log_level: u8) -> AtomicSwitch {
    AtomicSwitch::new(new_drain(level_from_u8(log_level)))
}

impl Logger {
    pub fn new(log_level: u8) -> Self {
        let drain = drain_from_log_level(log_level);
        let ctrl = drain.ctrl();
        let logger = slog::Logger::root(drain, slog::o!("version" => env!("CARGO_PKG_VERSION")));
        Logger {
            log_level: Mutex::new(log_level),
            logger,
            ctrl,
        }
    }

    /// Route the `log` crate macros into our slog drain
    pub fn set_global(&self) -> &Self {
        let guard = slog_scope::set_global_logger(self.logger.clone());
        // https://github.com/slog-rs/slog/issues/249
        guard.cancel_reset();
        // Only fails if a logger was already installed, keep the first one
        let _ = slog_stdlog::init_with_level(log::Level::Trace);
        self
    }

    /// Swap the drain in place, loggers already handed out follow the switch
    pub fn set_log_level(&self, log_level: u8) -> &Self {
        self.ctrl.set(drain_from_log_level(log_level));
        if let Ok(mut ll) = self.log_level.lock() {
            *ll = log_level;
        }
        self
    }

    pub fn log_level(&self) -> u8 {
        self.log_level
            .lock()
            .map(|ll| *ll)
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
