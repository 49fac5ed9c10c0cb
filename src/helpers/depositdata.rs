use alloy::primitives::{B256, FixedBytes};
use eyre::{Result, bail, eyre};
use serde_derive::Serialize;
use tree_hash::TreeHash;

/// Phase 0 `DepositData` SSZ container, the deposit contract recomputes
/// its hash tree root and rejects calls with a mismatching `deposit_data_root`
#[derive(Debug, Clone, PartialEq, tree_hash_derive::TreeHash, Serialize)]
pub struct DepositData {
    /// Validator public key
    pub pubkey: FixedBytes<48>,
    /// Withdrawal credentials
    pub withdrawal_credentials: B256,
    /// Amount of ether deposited in gwei
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    /// Deposit signature
    pub signature: FixedBytes<96>,
}

impl DepositData {
    pub fn root(&self) -> B256 {
        B256::from(self.tree_hash_root().0)
    }

    /// The pubkey must be a valid compressed BLS12-381 G1 point
    pub fn validate_pubkey(&self) -> Result<()> {
        blst::min_pk::PublicKey::key_validate(self.pubkey.as_slice())
            .map(|_| ())
            .map_err(|e| eyre!("invalid BLS public key: {:?}", e))
    }

    pub fn verify_root(&self, deposit_data_root: &B256) -> Result<()> {
        let root = self.root();
        if root != *deposit_data_root {
            bail!(
                "deposit_data_root mismatch (declared: {}, computed: {})",
                deposit_data_root,
                root
            );
        }
        Ok(())
    }
}
