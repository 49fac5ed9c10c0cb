use eyre::{Result, WrapErr};

use alloy::{
    consensus::{SignableTransaction, Signed, TxEnvelope, TypedTransaction},
    eips::eip2718::Decodable2718,
    network::{TransactionBuilder, TxSigner},
    primitives::Address,
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};

/// The deposit sender, a plain secp256k1 private key
pub struct Account {
    signer: PrivateKeySigner,
}

// Never print the secret
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.signer.address())
            .finish()
    }
}

impl Account {
    /// Accepts the key hex encoded, with or without the `0x` prefix
    pub fn from_private_key(private_key: &str) -> Result<Account> {
        // Don't wrap the parse error with the input, it's the secret
        let signer = private_key
            .trim()
            .parse::<PrivateKeySigner>()
            .wrap_err("Invalid private key")?;
        Ok(Account { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub async fn sign_transaction(
        &self,
        tx: &TransactionRequest,
    ) -> Result<Signed<TypedTransaction>> {
        let mut tx_signable = tx.clone().build_unsigned()?;
        let signature = self.signer.sign_transaction(&mut tx_signable).await?;
        Ok(tx_signable.into_signed(signature))
    }

    pub async fn sign_tx_and_decode(&self, tx: &TransactionRequest) -> Result<TxEnvelope> {
        let tx_signed = self.sign_transaction(tx).await?;
        let mut buf: Vec<u8> = Vec::new();
        tx_signed.eip2718_encode(&mut buf);
        Ok(TxEnvelope::decode_2718(&mut buf.as_ref())?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::{
        consensus::Transaction,
        network::TransactionBuilder,
        primitives::{Bytes, U256},
    };

    // Well known dev chain key #0
    pub(crate) const TEST_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    pub(crate) fn test_address() -> Address {
        crate::parse_address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    }

    #[test]
    fn address_from_key() {
        assert_eq!(
            Account::from_private_key(TEST_KEY).unwrap().address(),
            test_address()
        );
        assert_eq!(
            Account::from_private_key(&format!("0x{TEST_KEY}"))
                .unwrap()
                .address(),
            test_address()
        );
    }

    #[test]
    fn invalid_key_is_not_echoed() {
        let err = Account::from_private_key("0xdeadbeefzz").unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
        assert!(!format!("{:?}", err).contains("deadbeef"));
        let account = Account::from_private_key(TEST_KEY).unwrap();
        assert!(!format!("{:?}", account).contains(TEST_KEY));
    }

    #[tokio::test]
    async fn sign_eip1559() {
        let account = Account::from_private_key(TEST_KEY).unwrap();
        let tx = TransactionRequest::default()
            .with_from(account.address())
            .with_to(*crate::chain::DEPOSIT_CONTRACT_ADDR)
            .with_chain_id(17000)
            .with_nonce(3)
            .with_gas_limit(300_000)
            .with_max_priority_fee_per_gas(1_000_000_000)
            .with_max_fee_per_gas(30_000_000_000)
            .with_value(U256::from(1u64))
            .with_input(Bytes::from_static(&[0x22, 0x89, 0x51, 0x18]));
        let envelope = account.sign_tx_and_decode(&tx).await.unwrap();
        assert!(envelope.is_eip1559());
        assert_eq!(envelope.chain_id(), Some(17000));
        assert_eq!(envelope.nonce(), 3);
        assert_eq!(
            envelope.clone().into_signed().recover_signer().unwrap(),
            account.address()
        );
    }
}
