use alloy::{
    consensus::TxEnvelope,
    eips::eip1559::Eip1559Estimation,
    primitives::{Address, BlockNumber, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
};
use colored::*;
use eyre::{Result, WrapErr, bail};
use log::*;

use crate::chain;

/// Everything the deposit workflow needs from a node
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn chain_id(&self) -> Result<u64>;

    /// Next usable nonce, counting txs still in the mempool
    async fn pending_nonce(&self, addr: &Address) -> Result<u64>;

    async fn estimate_fees(&self) -> Result<Eip1559Estimation>;

    async fn send_tx_envelope(&self, tx: TxEnvelope) -> Result<TxHash>;

    /// `None` until the tx is mined
    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>>;
}

pub struct Client {
    pub rpc_url: String,
    provider: DynProvider,
}

impl Client {
    pub async fn connect(url: &str) -> Result<Client> {
        if url.trim().is_empty() {
            bail!("must specify a valid --rpc-url")
        };
        url::Url::parse(url).wrap_err_with(|| format!("Invalid RPC URL '{}'", url))?;

        let provider = DynProvider::new(
            ProviderBuilder::new()
                .connect(url)
                .await
                .wrap_err_with(|| format!("Connect failed to '{}'", url))?,
        );
        let client = Client {
            rpc_url: url.to_string(),
            provider,
        };

        let chain_id = client.chain_id().await?;
        let height = client.block_number().await?;
        info!(
            "Connected to {} {}:{} {}:{}",
            chain::chain_name(chain_id).green().bold(),
            "chainId".white().bold(),
            format!("{:?}", chain_id).blue(),
            "height".white().bold(),
            format!("{:?}", height).blue(),
        );
        Ok(client)
    }

    pub async fn block_number(&self) -> Result<BlockNumber> {
        Ok(self.provider.get_block_number().await?)
    }
}

impl ChainClient for Client {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .wrap_err("Failed to get chain ID")
    }

    async fn pending_nonce(&self, addr: &Address) -> Result<u64> {
        self.provider
            .get_transaction_count(*addr)
            .pending()
            .await
            .wrap_err_with(|| format!("Failed to get nonce for {}", addr))
    }

    async fn estimate_fees(&self) -> Result<Eip1559Estimation> {
        self.provider
            .estimate_eip1559_fees()
            .await
            .wrap_err("Failed to estimate EIP1559 fees")
    }

    async fn send_tx_envelope(&self, tx: TxEnvelope) -> Result<TxHash> {
        let pending = self
            .provider
            .send_tx_envelope(tx)
            .await
            .wrap_err("Failed to send transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(*tx_hash)
            .await
            .wrap_err_with(|| format!("Failed to get transaction receipt for {}", tx_hash))
    }
}
