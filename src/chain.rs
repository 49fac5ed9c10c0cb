use alloy::primitives::Address;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::parse_address;

/// Default deposit destination, the well-known test network contract
pub static DEPOSIT_CONTRACT_ADDR: Lazy<Address> =
    Lazy::new(|| parse_address!("0x4242424242424242424242424242424242424242"));

#[derive(Debug, Clone)]
pub struct ChainData {
    pub id: u64,
    pub name: &'static str,
    pub deposit_contract: Address,
}

pub static CHAINDATA: Lazy<HashMap<u64, ChainData>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        1,
        ChainData {
            id: 1,
            name: "mainnet",
            deposit_contract: parse_address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
        },
    );
    m.insert(
        17000,
        ChainData {
            id: 17000,
            name: "holesky",
            deposit_contract: parse_address!("0x4242424242424242424242424242424242424242"),
        },
    );
    m.insert(
        560048,
        ChainData {
            id: 560048,
            name: "hoodi",
            deposit_contract: parse_address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
        },
    );
    m.insert(
        11155111,
        ChainData {
            id: 11155111,
            name: "sepolia",
            deposit_contract: parse_address!("0x7f02C3E3c98b133055B8B348B2Ac625669Ed295D"),
        },
    );
    m
});

pub fn chain_data(chain_id: u64) -> Option<&'static ChainData> {
    CHAINDATA.get(&chain_id)
}

pub fn chain_name(chain_id: u64) -> String {
    match chain_data(chain_id) {
        Some(cd) => cd.name.to_string(),
        None => format!("chainId:{}", chain_id),
    }
}

/// Canonical deposit contract of a known chain when it differs from `deposit_contract`
pub fn deposit_contract_mismatch(chain_id: u64, deposit_contract: &Address) -> Option<Address> {
    chain_data(chain_id)
        .map(|cd| cd.deposit_contract)
        .filter(|canonical| canonical != deposit_contract)
}
