use eyre::{Result, WrapErr, eyre};
use log::*;
use std::path::Path;

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    primitives::{Bytes, Selector},
};

use crate::deposit::DecodedDeposit;

// https://github.com/ethereum/consensus-specs/blob/dev/solidity_deposit_contract/deposit_contract.sol
pub const DEPOSIT_SIGNATURE: &str = "deposit(bytes,bytes,bytes,bytes32)";

/// The `deposit` entry of the deposit contract JSON ABI
#[derive(Debug, Clone)]
pub struct DepositAbi {
    function: Function,
}

impl DepositAbi {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read ABI file {:?}", path))?;
        let abi = Self::from_json(&json).wrap_err_with(|| format!("{:?}", path))?;
        debug!(
            "Loaded contract ABI {:?}, {} selector: {}",
            path,
            DEPOSIT_SIGNATURE,
            abi.selector()
        );
        Ok(abi)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let abi: JsonAbi = serde_json::from_str(json).wrap_err("Failed to parse contract ABI")?;
        let function = abi
            .function("deposit")
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|f| f.signature() == DEPOSIT_SIGNATURE)
            })
            .cloned()
            .ok_or_else(|| eyre!("contract ABI has no `{}` function", DEPOSIT_SIGNATURE))?;
        Ok(DepositAbi { function })
    }

    pub fn selector(&self) -> Selector {
        self.function.selector()
    }

    /// Selector prefixed `deposit(pubkey, withdrawal_credentials, signature, deposit_data_root)`
    pub fn encode_deposit(&self, deposit: &DecodedDeposit) -> Result<Bytes> {
        let data = &deposit.deposit_data;
        let input = self
            .function
            .abi_encode_input(&[
                DynSolValue::Bytes(data.pubkey.to_vec()),
                DynSolValue::Bytes(data.withdrawal_credentials.to_vec()),
                DynSolValue::Bytes(data.signature.to_vec()),
                DynSolValue::FixedBytes(deposit.deposit_data_root, 32),
            ])
            .map_err(|e| eyre!("Failed to pack arguments: {}", e))?;
        Ok(input.into())
    }
}
