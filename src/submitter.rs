use colored::*;
use eyre::{Result, WrapErr, bail};
use log::*;
use std::time::Duration;

use alloy::{
    eips::eip1559::Eip1559Estimation,
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{
    abi::DepositAbi,
    account::Account,
    chain,
    confirm::Confirm,
    deposit::DepositRecord,
    rpc::ChainClient,
    tx,
};

/// Enough for a deposit contract call, which costs well under 100k
pub const GAS_LIMIT: u64 = 300_000;

#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    pub deposit_contract: Address,
    pub gas_limit: u64,
    /// Skip the fee estimation RPC and use these
    pub fee_override: Option<Eip1559Estimation>,
    /// `None` waits for the receipt forever
    pub receipt_timeout: Option<Duration>,
    pub poll_interval: Duration,
    /// Records before this index are not submitted
    pub skip: usize,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            deposit_contract: *chain::DEPOSIT_CONTRACT_ADDR,
            gas_limit: GAS_LIMIT,
            fee_override: None,
            receipt_timeout: Some(Duration::from_secs(600)),
            poll_interval: Duration::from_secs(1),
            skip: 0,
        }
    }
}

impl std::fmt::Display for SubmitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "deposit_contract: {}, gas_limit: {}, fees: {}, receipt_timeout: {}, \
             poll_interval: {:?}, skip: {}",
            self.deposit_contract,
            self.gas_limit,
            match &self.fee_override {
                Some(fees) => format!(
                    "{}/{} wei",
                    fees.max_priority_fee_per_gas, fees.max_fee_per_gas
                ),
                None => "estimated".to_string(),
            },
            match self.receipt_timeout {
                Some(timeout) => format!("{:?}", timeout),
                None => "none".to_string(),
            },
            self.poll_interval,
            self.skip
        )
    }
}

/// Lifecycle of a single deposit, `New` until the tx is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStage {
    New,
    Built,
    Confirmed,
    Signed,
    Broadcast,
    Mined,
    Pending,
}

impl std::fmt::Display for DepositStage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            DepositStage::New => "new",
            DepositStage::Built => "built",
            DepositStage::Confirmed => "confirmed",
            DepositStage::Signed => "signed",
            DepositStage::Broadcast => "broadcast",
            DepositStage::Mined => "mined",
            DepositStage::Pending => "pending",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositStatus {
    Mined {
        block_number: Option<u64>,
        success: bool,
    },
    /// Receipt wait timed out, the tx may still be mined later
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Position in the deposit data file
    pub index: usize,
    pub pubkey: String,
    pub tx_hash: TxHash,
    pub status: DepositStatus,
}

pub struct Submitter<'a, C: ChainClient> {
    client: &'a C,
    account: &'a Account,
    abi: &'a DepositAbi,
    confirm: Box<dyn Confirm + 'a>,
    config: SubmitterConfig,
}

impl<'a, C: ChainClient> Submitter<'a, C> {
    pub fn new(
        client: &'a C,
        account: &'a Account,
        abi: &'a DepositAbi,
        confirm: Box<dyn Confirm + 'a>,
        config: SubmitterConfig,
    ) -> Self {
        Submitter {
            client,
            account,
            abi,
            confirm,
            config,
        }
    }

    /// Submit every record in order, the first failure aborts the batch
    pub async fn submit(&mut self, records: &[DepositRecord]) -> Result<Vec<DepositOutcome>> {
        let mut outcomes = Vec::with_capacity(records.len());
        if self.config.skip >= records.len() && !records.is_empty() {
            warn!(
                "Skipping {} deposit record(s), nothing left to submit",
                self.config.skip
            );
        }
        for (index, record) in records.iter().enumerate().skip(self.config.skip) {
            let mut stage = DepositStage::New;
            match self.submit_one(index, record, &mut stage).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    if !outcomes.is_empty() {
                        warn!(
                            "{} deposit(s) submitted before the failure, rerun with --skip {} \
                             once the cause is fixed",
                            outcomes.len(),
                            index
                        );
                        tx::print_summary(&outcomes);
                    }
                    return Err(e.wrap_err(format!(
                        "Deposit #{} ({}) aborted at stage '{}'",
                        index,
                        tx::short_pubkey(&record.pubkey),
                        stage
                    )));
                }
            }
        }
        Ok(outcomes)
    }

    async fn submit_one(
        &mut self,
        index: usize,
        record: &DepositRecord,
        stage: &mut DepositStage,
    ) -> Result<DepositOutcome> {
        info!(
            "Deposit #{} pubkey {}",
            index,
            tx::short_pubkey(&record.pubkey).blue()
        );

        let from = self.account.address();
        let chain_id = self.client.chain_id().await?;
        debug!("Chain ID: {}", chain_id);
        let nonce = self.client.pending_nonce(&from).await?;
        let fees = match &self.config.fee_override {
            Some(fees) => fees.clone(),
            None => self.client.estimate_fees().await?,
        };
        debug!(
            "nonce: {} priority fee: {} max fee: {}",
            nonce, fees.max_priority_fee_per_gas, fees.max_fee_per_gas
        );

        let deposit = record.decode()?;
        deposit.verify()?;
        trace!(
            "{}",
            serde_json::to_string_pretty(&deposit.deposit_data).unwrap_or_default()
        );
        let input = self.abi.encode_deposit(&deposit)?;

        let tx = self.build_tx(from, chain_id, nonce, &fees, record.value_wei(), input);
        trace!("{:#?}", tx);
        *stage = DepositStage::Built;

        if !self.confirm.confirm(&tx::sprintf_tx(&tx, None))? {
            bail!("Transaction cancelled");
        }
        *stage = DepositStage::Confirmed;

        let tx_envelope = self
            .account
            .sign_tx_and_decode(&tx)
            .await
            .wrap_err("Failed to sign transaction")?;
        let tx_hash = *tx_envelope.tx_hash();
        *stage = DepositStage::Signed;

        let sent_hash = self.client.send_tx_envelope(tx_envelope).await?;
        if sent_hash != tx_hash {
            warn!(
                "Node returned tx hash {} for signed tx {}",
                sent_hash, tx_hash
            );
        }
        *stage = DepositStage::Broadcast;
        println!(
            "Transaction {} sent, waiting for the receipt...",
            tx_hash.to_string().red()
        );

        let status = match self.wait_for_receipt(&tx_hash).await? {
            Some(receipt) => {
                *stage = DepositStage::Mined;
                println!("{}", tx::sprintf_receipt(&receipt));
                debug!(
                    "{}",
                    serde_json::to_string_pretty(&receipt).unwrap_or_default()
                );
                if !receipt.status() {
                    warn!("Transaction {} was mined but reverted", tx_hash);
                }
                DepositStatus::Mined {
                    block_number: receipt.block_number(),
                    success: receipt.status(),
                }
            }
            None => {
                *stage = DepositStage::Pending;
                warn!(
                    "No receipt for {} after {:?}, moving on, check it later",
                    tx_hash,
                    self.config.receipt_timeout.unwrap_or_default()
                );
                DepositStatus::Pending
            }
        };

        Ok(DepositOutcome {
            index,
            pubkey: record.pubkey.clone(),
            tx_hash,
            status,
        })
    }

    pub fn build_tx(
        &self,
        from: Address,
        chain_id: u64,
        nonce: u64,
        fees: &Eip1559Estimation,
        value: U256,
        input: Bytes,
    ) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_to(self.config.deposit_contract)
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_gas_limit(self.config.gas_limit)
            .with_value(value)
            .with_input(input)
    }

    /// Poll until mined, `Ok(None)` once `receipt_timeout` expires
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        let poll = async {
            loop {
                if let Some(receipt) = self.client.receipt(tx_hash).await? {
                    return Ok::<_, eyre::Report>(receipt);
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };
        match self.config.receipt_timeout {
            None => Ok(Some(poll.await?)),
            Some(timeout) => match tokio::time::timeout(timeout, poll).await {
                Ok(receipt) => Ok(Some(receipt?)),
                Err(_) => Ok(None),
            },
        }
    }
}
