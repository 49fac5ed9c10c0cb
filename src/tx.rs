use colored::*;

use alloy::{
    primitives::{TxKind, hex},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{
    chain, format_eth, helpers,
    submitter::{DepositOutcome, DepositStatus},
};

const ALIGN: usize = 16;

pub fn sprintf_tx(tx: &TransactionRequest, align: Option<usize>) -> String {
    let mut pretty_tx = String::default();
    let align = align.unwrap_or(ALIGN);
    macro_rules! push_field {
        ($s:expr, $v: expr, $c: ident) => {
            pretty_tx.push_str(
                format!(
                    "\n    {:align$}{}",
                    format!("{}:", $s).white().bold(),
                    format!("{}", $v).$c(),
                )
                .as_str(),
            );
        };
    }
    macro_rules! opt {
        ($v: expr) => {
            match $v {
                Some(v) => v.to_string(),
                None => "-".to_string(),
            }
        };
    }
    if let Some(chain_id) = tx.chain_id {
        push_field!(
            "chain_id",
            format!("{} ({})", chain_id, chain::chain_name(chain_id)),
            green
        );
    }
    push_field!("nonce", opt!(tx.nonce), magenta);
    push_field!("from", opt!(tx.from), blue);
    let to = match tx.to {
        Some(TxKind::Call(address)) => address.to_string(),
        Some(TxKind::Create) => "CREATE".to_string(),
        None => "-".to_string(),
    };
    push_field!("to", to, blue);
    if let Some(value) = tx.value {
        push_field!(
            "value",
            format!(
                "{} eth ({} gwei)",
                helpers::format_eth(value),
                helpers::format_gwei(value)
            ),
            yellow
        );
    }
    if let Some(input) = tx.input.input().filter(|input| !input.is_empty()) {
        push_field!("data", format!("0x{}", hex::encode(input)), white);
    }
    push_field!("gas_limit", opt!(tx.gas), green);
    push_field!(
        "fees",
        format!(
            "{} {} {} {} {}",
            "Priority".magenta(),
            format!(
                "{} gwei",
                opt!(tx.max_priority_fee_per_gas.map(helpers::format_gwei))
            )
            .blue(),
            "|".white().bold(),
            "Max".magenta(),
            format!("{} gwei", opt!(tx.max_fee_per_gas.map(helpers::format_gwei))).blue()
        ),
        normal
    );
    pretty_tx
}

pub fn sprintf_receipt(receipt: &TransactionReceipt) -> String {
    let align = ALIGN;
    let mut pretty = String::default();
    pretty.push_str(
        format!(
            "    {:align$}{}\n",
            "tx_hash:".white().bold(),
            receipt.transaction_hash.to_string().red(),
        )
        .as_str(),
    );
    pretty.push_str(
        format!(
            "    {:align$}{}\n",
            "block_number:".white().bold(),
            receipt
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
                .blue(),
        )
        .as_str(),
    );
    pretty.push_str(
        format!(
            "    {:align$}{}\n",
            "status:".white().bold(),
            match receipt.status() {
                true => "SUCCESS".green().bold(),
                false => "FAILED".red().bold(),
            },
        )
        .as_str(),
    );
    pretty.push_str(
        format!(
            "    {:align$}{}\n",
            "gas_used:".white().bold(),
            receipt.gas_used.to_string().magenta(),
        )
        .as_str(),
    );
    pretty.push_str(format_eth!(
        align,
        "fee",
        white,
        receipt.gas_used as u128 * receipt.effective_gas_price,
        yellow
    ));
    pretty
}

pub fn print_summary(outcomes: &[DepositOutcome]) {
    if outcomes.is_empty() {
        return;
    }
    println!("\n[{}]", "DEPOSITS".magenta().bold());
    outcomes.iter().for_each(|outcome| {
        let status = match &outcome.status {
            DepositStatus::Mined {
                block_number,
                success: true,
            } => format!("mined in block {}", block_number.unwrap_or_default()).green(),
            DepositStatus::Mined {
                block_number,
                success: false,
            } => format!("FAILED in block {}", block_number.unwrap_or_default()).red(),
            DepositStatus::Pending => "pending".yellow(),
        };
        println!(
            "{:<4} {} {} {}",
            format!("{}.", outcome.index).green().bold(),
            short_pubkey(&outcome.pubkey).blue(),
            outcome.tx_hash.to_string().red(),
            status
        );
    });
}

/// "0x" + first and last 4 bytes of a validator pubkey
pub fn short_pubkey(pubkey: &str) -> String {
    let pubkey = pubkey.trim_start_matches("0x");
    match pubkey.len() > 16 {
        true => format!("0x{}..{}", &pubkey[..8], &pubkey[pubkey.len() - 8..]),
        false => format!("0x{}", pubkey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        network::TransactionBuilder,
        primitives::{Bytes, U256},
    };

    #[test]
    fn describes_deposit_tx() {
        colored::control::set_override(false);
        let tx = TransactionRequest::default()
            .with_from(crate::account::tests::test_address())
            .with_to(*chain::DEPOSIT_CONTRACT_ADDR)
            .with_chain_id(17000)
            .with_nonce(5)
            .with_gas_limit(300_000)
            .with_max_priority_fee_per_gas(1_500_000_000)
            .with_max_fee_per_gas(30_000_000_000)
            .with_value(U256::from(32_000_000_000_000_000_000u128))
            .with_input(Bytes::from_static(&[0x22, 0x89, 0x51, 0x18]));
        let pretty = sprintf_tx(&tx, None);
        assert!(pretty.contains("17000 (holesky)"));
        assert!(pretty.contains("0x4242424242424242424242424242424242424242"));
        assert!(pretty.contains("32.0 eth (32000000000.0 gwei)"));
        assert!(pretty.contains("300000"));
        assert!(pretty.contains("0x22895118"));
        assert!(pretty.contains("1.5 gwei"));
    }

    #[test]
    fn short_pubkeys() {
        assert_eq!(
            short_pubkey(&format!("0x{}", "ab".repeat(48))),
            "0xabababab..abababab"
        );
        assert_eq!(short_pubkey("abcd"), "0xabcd");
    }
}
