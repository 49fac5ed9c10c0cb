use eyre::{Result, WrapErr, bail};
use log::*;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use alloy::primitives::{B256, FixedBytes, U256, hex};

use crate::helpers::{self, depositdata::DepositData};

/// One deposit as found in the deposit data file (e.g. `staking-deposit-cli`
/// output), unknown fields such as `deposit_message_root` or `fork_version`
/// are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRecord {
    /// Deposit amount in gwei
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub signature: String,
    pub deposit_data_root: String,
}

/// A record with all hex fields decoded to their exact byte lengths
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDeposit {
    pub deposit_data: DepositData,
    pub deposit_data_root: B256,
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<FixedBytes<N>> {
    let bytes = hex::decode(value.trim()).wrap_err_with(|| format!("Failed to decode {field}"))?;
    if bytes.len() != N {
        bail!(
            "Failed to decode {field}: expected {N} bytes, got {}",
            bytes.len()
        );
    }
    Ok(FixedBytes::from_slice(&bytes))
}

impl DepositRecord {
    pub fn decode(&self) -> Result<DecodedDeposit> {
        Ok(DecodedDeposit {
            deposit_data: DepositData {
                pubkey: decode_fixed::<48>("pubkey", &self.pubkey)?,
                withdrawal_credentials: decode_fixed::<32>(
                    "withdrawal credentials",
                    &self.withdrawal_credentials,
                )?,
                amount: self.amount,
                signature: decode_fixed::<96>("signature", &self.signature)?,
            },
            deposit_data_root: decode_fixed::<32>("deposit data root", &self.deposit_data_root)?,
        })
    }

    /// Tx value, the record amount is in gwei
    pub fn value_wei(&self) -> U256 {
        helpers::gwei_to_wei(self.amount)
    }
}

impl DecodedDeposit {
    /// Catch what the deposit contract would revert on before we pay for it
    pub fn verify(&self) -> Result<()> {
        self.deposit_data.validate_pubkey()?;
        self.deposit_data.verify_root(&self.deposit_data_root)
    }
}

pub fn load_records(path: &Path) -> Result<Vec<DepositRecord>> {
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("Failed to read deposit data file {:?}", path))?;
    let records: Vec<DepositRecord> = serde_json::from_reader(std::io::BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse deposit data file {:?}", path))?;
    debug!("Loaded {} deposit record(s) from {:?}", records.len(), path);
    Ok(records)
}
