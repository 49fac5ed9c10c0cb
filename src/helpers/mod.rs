pub mod datetime;
pub mod depositdata;
pub mod reedline;

use eyre::{Result, eyre};
use std::path::PathBuf;

use alloy::primitives::{
    U256,
    utils::{ParseUnits, Unit, format_units, parse_units},
};

/// Deposit amounts are denominated in gwei, the tx value in wei
pub fn gwei_to_wei(amount_gwei: u64) -> U256 {
    U256::from(amount_gwei) * Unit::GWEI.wei()
}

/// Parse a fractional gwei amount (fee args) into wei
pub fn parse_gwei(amount: f64) -> Result<u128> {
    let wei: U256 = parse_units(&amount.to_string(), "gwei")?.into();
    wei.try_into()
        .map_err(|_| eyre!("{} gwei does not fit in u128 wei", amount))
}

pub fn format_unit<T>(amount: T, decimals: u8) -> String
where
    T: Into<ParseUnits>,
{
    let units = match format_units(amount, decimals) {
        Ok(s) => s,
        Err(e) => return format!("<{e}>"),
    };
    // Trim trailing zeros but keep at least one fractional digit
    match units.split_once('.') {
        Some((int, frac)) => {
            let mut frac = frac.trim_end_matches('0').to_string();
            if frac.is_empty() {
                frac.push('0');
            }
            frac.truncate(10);
            format!("{}.{}", int, frac)
        }
        None => units,
    }
}

pub fn format_eth<T>(amount: T) -> String
where
    T: Into<ParseUnits>,
{
    format_unit(amount, 18)
}

pub fn format_gwei<T>(amount: T) -> String
where
    T: Into<ParseUnits>,
{
    format_unit(amount, 9)
}

/// Expand "~" and env vars in user supplied paths
pub fn expand_path(path: &PathBuf) -> Result<PathBuf> {
    let path = path
        .to_str()
        .ok_or_else(|| eyre!("path is not valid UTF-8: {:?}", path))?;
    Ok(shellexpand::full(path)?.to_string().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_to_wei_is_exact() {
        assert_eq!(gwei_to_wei(0), U256::ZERO);
        assert_eq!(gwei_to_wei(1), U256::from(1_000_000_000u64));
        assert_eq!(
            gwei_to_wei(32_000_000_000),
            U256::from(32_000_000_000_000_000_000u128)
        );
        // No overflow at the top of the u64 range
        assert_eq!(
            gwei_to_wei(u64::MAX),
            U256::from(u64::MAX as u128 * 1_000_000_000u128)
        );
    }

    #[test]
    fn parse_fee_gwei() {
        assert_eq!(parse_gwei(1.5).unwrap(), 1_500_000_000u128);
        assert_eq!(parse_gwei(0.0).unwrap(), 0u128);
    }

    #[test]
    fn pretty_units() {
        assert_eq!(format_eth(U256::from(32_000_000_000_000_000_000u128)), "32.0");
        assert_eq!(format_gwei(1_500_000_000u128), "1.5");
        assert_eq!(format_eth(U256::from(1u64)), "0.0000000000");
    }

    #[test]
    fn expand_home() {
        let home = std::env::var("HOME").unwrap();
        let expanded = expand_path(&PathBuf::from("~/deposit_data.json")).unwrap();
        assert_eq!(expanded, PathBuf::from(format!("{home}/deposit_data.json")));
    }
}
