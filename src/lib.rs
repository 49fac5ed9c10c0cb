pub mod macros;

pub mod abi;
pub mod account;
pub mod chain;
pub mod config;
pub mod confirm;
pub mod deposit;
pub mod helpers;
pub mod logger;
pub mod rpc;
pub mod submitter;
pub mod tx;
