use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::time::Duration;
use std::{fs::File, io::BufReader};

use alloy::{eips::eip1559::Eip1559Estimation, primitives::Address};
use eyre::{Result, WrapErr, bail, eyre};
use serde_derive::Deserialize;

use clap_serde_derive::{
    ClapSerde,
    clap::{self, Parser},
};

use crate::{chain, helpers, submitter::SubmitterConfig};

pub const DEFAULT_ABI_PATH: &str = "abi.json";
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[allow(deprecated)]
fn config_file() -> PathBuf {
    let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::home_dir()
            .unwrap_or_else(|| PathBuf::from(OsString::from(".")))
            .join(".config"),
    };
    config_home.join("eth-deposit").join("config.toml")
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Config file
    #[arg(short, long = "config", default_value = config_file().into_os_string())]
    pub config_path: Option<PathBuf>,

    /// Global arguments
    #[command(flatten)]
    pub config: <CliArgs as ClapSerde>::Opt,

    /// Deposit data file, a JSON array of deposit records
    #[arg(value_name = "DEPOSIT_DATA", required = true)]
    pub deposit_data: PathBuf,
}

// Make sure all values are optional or parsing fails if a value
// is missing in the config file, defaults are applied in `resolve`
// so that the config file can still set values omitted on the CLI
#[derive(Debug, Clone, ClapSerde, Deserialize)]
pub struct CliArgs {
    /// Logging level (0: critical, 1: error, 2: warning, 3: info, 4: debug, 5: trace)
    #[arg(short, long = "log-level", required = false)]
    pub log_level: Option<u8>,

    /// JsonRPC URL
    #[arg(long = "rpc-url", env = "RPC_URL", required = false)]
    pub rpc_url: Option<String>,

    /// Sender account private key (hex)
    #[arg(
        long = "private-key",
        env = "PRIVATE_KEY",
        hide_env_values = true,
        required = false
    )]
    pub private_key: Option<String>,

    /// Deposit contract ABI file
    #[arg(long = "abi", required = false)]
    pub abi: Option<PathBuf>,

    /// Deposit contract address
    #[arg(long = "deposit-contract", required = false)]
    pub deposit_contract: Option<String>,

    /// Skip user confirmation ("y" prompt)
    // No `SetTrue`, an absent flag must not override `yes = true` from the config file
    #[arg(
        short,
        long,
        required = false,
        num_args = 0,
        default_missing_value = "true"
    )]
    pub yes: bool,

    /// Skip the first N deposit records (resume an aborted batch)
    #[arg(long, required = false)]
    pub skip: Option<usize>,

    /// Max priority fee per gas in gwei
    #[arg(long, required = false)]
    pub max_priority: Option<f64>,

    /// Max fee per gas in gwei
    #[arg(long, required = false)]
    pub max_fee: Option<f64>,

    /// Seconds to wait for a tx receipt, 0 to wait forever
    #[arg(long = "receipt-timeout", required = false)]
    pub receipt_timeout: Option<u64>,

    /// Receipt polling interval in milliseconds
    #[arg(long = "poll-interval", required = false)]
    pub poll_interval: Option<u64>,
}

/// Everything the binary needs after merging CLI, env and config file
#[derive(Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub private_key: String,
    pub abi: PathBuf,
    pub yes: bool,
    pub submitter: SubmitterConfig,
}

// Never print the private key
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("abi", &self.abi)
            .field("yes", &self.yes)
            .field("submitter", &self.submitter)
            .finish()
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "rpc_url: {}, abi: {}, yes: {}, {}",
            self.rpc_url,
            self.abi.display(),
            self.yes,
            self.submitter
        )
    }
}

impl CliArgs {
    pub fn resolve(&self) -> Result<Settings> {
        let rpc_url = match &self.rpc_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => bail!("RPC URL not set, use --rpc-url or the RPC_URL env var"),
        };
        let private_key = match &self.private_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => bail!("private key not set, use --private-key or the PRIVATE_KEY env var"),
        };

        let abi = helpers::expand_path(
            &self
                .abi
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ABI_PATH)),
        )?;

        let deposit_contract = match &self.deposit_contract {
            Some(addr) => addr
                .parse::<Address>()
                .wrap_err_with(|| format!("invalid deposit contract address '{}'", addr))?,
            None => *chain::DEPOSIT_CONTRACT_ADDR,
        };

        // Fees are "all-or-none", if one is present the other must be as well
        let fee_override = match (self.max_fee, self.max_priority) {
            (None, None) => None,
            (Some(max_fee), Some(max_priority)) => {
                let max_fee_per_gas = helpers::parse_gwei(max_fee)?;
                let max_priority_fee_per_gas = helpers::parse_gwei(max_priority)?;
                if max_fee_per_gas < max_priority_fee_per_gas {
                    bail!(
                        "Max fee ({} gwei) must not be lower than priority fee ({} gwei)",
                        max_fee,
                        max_priority
                    );
                }
                Some(Eip1559Estimation {
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                })
            }
            _ => bail!("--max-fee and --max-priority must be used together"),
        };

        let receipt_timeout = match self
            .receipt_timeout
            .unwrap_or(DEFAULT_RECEIPT_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let poll_interval = match self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_MS) {
            0 => return Err(eyre!("--poll-interval must be greater than 0")),
            ms => Duration::from_millis(ms),
        };

        Ok(Settings {
            rpc_url,
            private_key,
            abi,
            yes: self.yes,
            submitter: SubmitterConfig {
                deposit_contract,
                fee_override,
                receipt_timeout,
                poll_interval,
                skip: self.skip.unwrap_or(0),
                ..SubmitterConfig::default()
            },
        })
    }
}

pub fn merge_args_from_file<T>(
    args: <T as ClapSerde>::Opt,
    maybe_path: Option<PathBuf>,
) -> Result<T>
where
    T: ClapSerde + serde::de::DeserializeOwned,
{
    match maybe_path {
        Some(path) => {
            let config_path = std::path::Path::new(&path);
            match config_path.exists() {
                true => {
                    let config = match config_path.extension().and_then(OsStr::to_str) {
                        Some("toml") => read_toml_config::<T, _>(config_path),
                        Some("json") => read_json_config::<T, _>(config_path),
                        Some("jsonc") => read_jsonc_config::<T, _>(config_path),
                        _ => {
                            bail!("Unsupported config file type: {:?}", path);
                        }
                    }?;
                    log::debug!("Loaded config file {:?}", config_path);
                    // Fields which are not None in `args` will be used to update
                    // the file values, command line (and env) take precedence
                    Ok(T::from(config).merge(args))
                }
                false => Ok(T::from(args)),
            }
        }
        None => Ok(T::from(args)),
    }
}

fn read_toml_config<T, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
    T: ClapSerde + serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).wrap_err_with(|| format!("{:?}", path))?;
    toml::from_str(&content).wrap_err_with(|| format!("{:?}", path))
}

fn read_json_config<T: ClapSerde, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
{
    let f = File::open(path).wrap_err_with(|| format!("{:?}", path))?;
    serde_json::from_reader::<_, <T as ClapSerde>::Opt>(BufReader::new(f))
        .wrap_err_with(|| format!("{:?}", path))
}

fn read_jsonc_config<T: ClapSerde, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
{
    let f = File::open(path).wrap_err_with(|| format!("{:?}", path))?;
    serde_jsonc::from_reader::<_, <T as ClapSerde>::Opt>(BufReader::new(f))
        .wrap_err_with(|| format!("{:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn args() -> CliArgs {
        CliArgs {
            log_level: None,
            rpc_url: Some("http://localhost:8545".into()),
            private_key: Some(KEY.into()),
            abi: None,
            deposit_contract: None,
            yes: false,
            skip: None,
            max_priority: None,
            max_fee: None,
            receipt_timeout: None,
            poll_interval: None,
        }
    }

    #[test]
    fn resolve_defaults() {
        let settings = args().resolve().unwrap();
        assert_eq!(settings.rpc_url, "http://localhost:8545");
        assert_eq!(settings.abi, PathBuf::from(DEFAULT_ABI_PATH));
        assert_eq!(
            settings.submitter.deposit_contract,
            *chain::DEPOSIT_CONTRACT_ADDR
        );
        assert_eq!(settings.submitter.gas_limit, 300_000);
        assert_eq!(
            settings.submitter.receipt_timeout,
            Some(Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS))
        );
        assert_eq!(settings.submitter.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.submitter.skip, 0);
        assert!(settings.submitter.fee_override.is_none());
        // Display and Debug must not leak the key
        assert!(!settings.to_string().contains(&KEY[2..]));
        assert!(!format!("{:?}", settings).contains(&KEY[2..]));
    }

    #[test]
    fn missing_credentials() {
        let mut no_url = args();
        no_url.rpc_url = None;
        let err = no_url.resolve().unwrap_err();
        assert!(err.to_string().contains("RPC URL"));

        let mut no_key = args();
        no_key.private_key = Some("  ".into());
        let err = no_key.resolve().unwrap_err();
        assert!(err.to_string().contains("private key"));
    }

    #[test]
    fn fee_override_all_or_none() {
        let mut half = args();
        half.max_fee = Some(20.0);
        assert!(half.resolve().is_err());

        let mut inverted = args();
        inverted.max_fee = Some(1.0);
        inverted.max_priority = Some(2.0);
        assert!(inverted.resolve().is_err());

        let mut both = args();
        both.max_fee = Some(20.0);
        both.max_priority = Some(1.5);
        let fees = both.resolve().unwrap().submitter.fee_override.unwrap();
        assert_eq!(fees.max_fee_per_gas, 20_000_000_000u128);
        assert_eq!(fees.max_priority_fee_per_gas, 1_500_000_000u128);
    }

    #[test]
    fn unbounded_receipt_wait() {
        let mut forever = args();
        forever.receipt_timeout = Some(0);
        assert_eq!(forever.resolve().unwrap().submitter.receipt_timeout, None);

        let mut no_poll = args();
        no_poll.poll_interval = Some(0);
        assert!(no_poll.resolve().is_err());
    }

    #[test]
    fn custom_deposit_contract() {
        let mut custom = args();
        custom.deposit_contract = Some("0x00000000219ab540356cBB839Cbe05303d7705Fa".into());
        assert_eq!(
            custom.resolve().unwrap().submitter.deposit_contract,
            crate::parse_address!("0x00000000219ab540356cBB839Cbe05303d7705Fa")
        );

        custom.deposit_contract = Some("0x1234".into());
        assert!(custom.resolve().is_err());
    }

    // Only assert on values PRIVATE_KEY/RPC_URL from the environment can't change
    #[test]
    fn config_file_merge() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "rpc_url = \"http://file:8545\"\nprivate_key = \"{KEY}\"\nreceipt_timeout = 30"
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "eth-deposit",
            "--rpc-url",
            "http://cli:8545",
            "deposit_data.json",
        ])
        .unwrap();
        assert_eq!(cli.deposit_data, PathBuf::from("deposit_data.json"));

        let config =
            merge_args_from_file::<CliArgs>(cli.config, Some(file.path().to_path_buf())).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.rpc_url, "http://cli:8545");
        assert_eq!(
            settings.submitter.receipt_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(!settings.yes);
    }

    #[test]
    fn yes_from_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "yes = true\nskip = 2").unwrap();

        let cli = Cli::try_parse_from(["eth-deposit", "deposit_data.json"]).unwrap();
        let config =
            merge_args_from_file::<CliArgs>(cli.config, Some(file.path().to_path_buf())).unwrap();
        assert!(config.yes);
        assert_eq!(config.skip, Some(2));

        let cli = Cli::try_parse_from(["eth-deposit", "-y", "deposit_data.json"]).unwrap();
        let config = merge_args_from_file::<CliArgs>(cli.config, None).unwrap();
        assert!(config.yes);

        let cli = Cli::try_parse_from(["eth-deposit", "deposit_data.json"]).unwrap();
        let config = merge_args_from_file::<CliArgs>(cli.config, None).unwrap();
        assert!(!config.yes);
    }

    #[test]
    fn unsupported_config_type() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let cli = Cli::try_parse_from(["eth-deposit", "deposit_data.json"]).unwrap();
        assert!(
            merge_args_from_file::<CliArgs>(cli.config, Some(file.path().to_path_buf())).is_err()
        );
    }
}
