#[macro_use]
extern crate log;

use clap::Parser;
use colored::*;
use eyre::Result;

use eth_deposit::{
    abi::DepositAbi,
    account::Account,
    chain,
    config::{self, *},
    confirm::{AssumeYes, Confirm, Prompt},
    deposit, helpers,
    logger::{self, Logger},
    rpc::{ChainClient, Client},
    submitter::Submitter,
    tx,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args with clap, env vars are read here as well
    let args = Cli::parse();

    // Setup our global logger early so config loading can log
    let logger = Logger::new(logger::DEFAULT_LOG_LEVEL);
    logger.set_global();

    // Load config file, "~/..." is allowed in the path
    let config_path = match args.config_path {
        Some(path) => Some(helpers::expand_path(&path)?),
        None => None,
    };
    let config = config::merge_args_from_file::<CliArgs>(args.config, config_path)?;
    if let Some(log_level) = config.log_level {
        logger.set_log_level(log_level);
    }
    let settings = config.resolve()?;
    debug!("{}", settings);

    let abi = DepositAbi::load(&settings.abi)?;
    let account = Account::from_private_key(&settings.private_key)?;
    info!("Sender account {}", account.address().to_string().blue());

    let records = deposit::load_records(&helpers::expand_path(&args.deposit_data)?)?;
    println!(
        "Deposit data has {} {}",
        records.len().to_string().green().bold(),
        match records.len() {
            1 => "entry",
            _ => "entries",
        }
    );

    let client = Client::connect(&settings.rpc_url).await?;
    let chain_id = client.chain_id().await?;
    if let Some(expected) =
        chain::deposit_contract_mismatch(chain_id, &settings.submitter.deposit_contract)
    {
        warn!(
            "Deposit contract {} differs from the known {} deposit contract {}",
            settings.submitter.deposit_contract.to_string().red(),
            chain::chain_name(chain_id),
            expected.to_string().green()
        );
    }

    let confirm: Box<dyn Confirm> = match settings.yes {
        true => Box::new(AssumeYes),
        false => Box::new(Prompt),
    };

    let outcomes = Submitter::new(&client, &account, &abi, confirm, settings.submitter)
        .submit(&records)
        .await?;
    tx::print_summary(&outcomes);

    Ok(())
}
