//! Display formatting: address labels, amounts and share text

use crate::config::ChainConstants;
use crate::types::{BetStatus, DisplayBet};
use alloy::primitives::{Address, U256};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Name-service suffixes shown verbatim instead of a shortened address
pub const RECOGNIZED_SUFFIXES: &[&str] = &[".eth"];

const PREFIX_CHARS: usize = 6;
const SUFFIX_CHARS: usize = 4;
const ETH_DECIMALS: u32 = 18;

/// `0x1234...abcd`. Strings too short to shorten are returned as-is.
pub fn shorten_address(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < PREFIX_CHARS + SUFFIX_CHARS {
        return raw.to_string();
    }

    let prefix: String = chars[..PREFIX_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - SUFFIX_CHARS..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

pub fn has_recognized_suffix(name: &str) -> bool {
    RECOGNIZED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Label for an address: its resolved name when that is an ENS-style name,
/// otherwise the shortened raw address
pub fn format_label(address: &str, resolved: Option<&str>) -> String {
    match resolved {
        Some(name) if has_recognized_suffix(name) => name.to_string(),
        _ => shorten_address(address),
    }
}

/// [`format_label`] for a typed address, shortened from its checksummed form
pub fn label_for(address: Address, resolved: Option<&str>) -> String {
    format_label(&address.to_checksum(None), resolved)
}

/// Exact wei to ETH conversion. `None` if the amount does not fit a `Decimal`.
pub fn wei_to_eth(wei: U256) -> Option<Decimal> {
    let mut value = Decimal::from_str(&wei.to_string()).ok()?;
    value.set_scale(ETH_DECIMALS).ok()?;
    Some(value.normalize())
}

/// Exact ETH to wei conversion. `None` for negative amounts or more than 18
/// fractional digits.
pub fn eth_to_wei(eth: Decimal) -> Option<U256> {
    if eth.is_sign_negative() && !eth.is_zero() {
        return None;
    }
    let eth = eth.normalize();
    let scale = eth.scale();
    if scale > ETH_DECIMALS {
        return None;
    }

    let mantissa = u128::try_from(eth.mantissa()).ok()?;
    let factor = U256::from(10u64).pow(U256::from(ETH_DECIMALS - scale));
    U256::from(mantissa).checked_mul(factor)
}

/// ETH amount with trailing zeros trimmed, e.g. `1.5`
pub fn format_eth(eth: Decimal) -> String {
    eth.normalize().to_string()
}

/// Two-decimal fiat amount, e.g. `1234.50`
pub fn format_usd(usd: Decimal) -> String {
    format!("{:.2}", usd.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// USD value of an ETH amount; zero if the product overflows
pub fn to_usd(eth: Decimal, rate: Decimal) -> Decimal {
    eth.checked_mul(rate).unwrap_or(Decimal::ZERO)
}

fn share_status(status: BetStatus) -> &'static str {
    match status {
        BetStatus::Resolved => "Resolved",
        BetStatus::Invalidated => "Invalidated",
        _ => "Pending",
    }
}

/// Shareable plain-text summary of a bet
pub fn share_text(bet: &DisplayBet) -> String {
    format!(
        "Check out this bet on Bets with Friends!\n\
         Conditions: {}\n\
         Better 1: {}\n\
         Better 2: {}\n\
         Decided By: {}\n\
         Wager: {} ETH (${} USD)\n\
         Status: {}\n\
         {}",
        bet.conditions,
        bet.better1_label,
        bet.better2_label,
        bet.decider_label,
        format_eth(bet.wager_eth),
        format_usd(bet.wager_usd),
        share_status(bet.status),
        ChainConstants::SITE_URL,
    )
}
