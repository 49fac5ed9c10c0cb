// HACK: instead of `#[macro_export]` only, we also `pub(crate) use <macro>`
// so that we can use `macros::<macro>!` inside the crate as well as from
// the binary crate (main.rs) through the library root
#![allow(unused_imports)]

#[macro_export]
macro_rules! parse_address {
    ($addr:tt) => {
        $addr.parse::<alloy::primitives::Address>().unwrap()
    };
}

#[macro_export]
macro_rules! format_eth {
    ($a: ident, $k:expr, $ck: ident, $v: expr, $cv: ident) => {
        format!(
            "    {:align$}{}\n",
            format!("{}:", $k).$ck().bold(),
            format!(
                "{} gwei ({} eth)",
                alloy::primitives::utils::format_units($v, "gwei").unwrap_or_default(),
                alloy::primitives::utils::format_ether($v),
            )
            .$cv(),
            align = $a
        )
        .as_str()
    };
}

pub(crate) use format_eth;
pub(crate) use parse_address;
