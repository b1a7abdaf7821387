//! Configuration management for the Bets with Friends client

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Client configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the chain the bet contracts live on
    pub rpc_url: String,

    /// Chain ID used when signing transactions
    pub chain_id: u64,

    /// Bet factory contract address
    pub factory_address: Address,

    /// Ethereum mainnet RPC used for ENS lookups
    pub ens_rpc_url: String,

    /// Whether to resolve ENS names at all
    pub ens_enabled: bool,

    /// ETH/USD price endpoint
    pub price_api_url: String,

    /// Upper bound on a single external read
    pub read_timeout: Duration,

    /// Private key for submitting transactions (optional, read-only without it)
    pub private_key: Option<String>,

    /// Port for the HTTP server
    pub server_port: u16,

    /// How often the server refreshes the exchange rate
    pub rate_refresh_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: ChainConstants::BASE_SEPOLIA_RPC.to_string(),
            chain_id: ChainConstants::BASE_SEPOLIA_CHAIN_ID,
            factory_address: ChainConstants::DEFAULT_FACTORY,
            ens_rpc_url: ChainConstants::MAINNET_RPC.to_string(),
            ens_enabled: true,
            price_api_url: ChainConstants::PRICE_API_URL.to_string(),
            read_timeout: Duration::from_millis(5000),
            private_key: None,
            server_port: 3000,
            rate_refresh_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let rpc_url = env::var("RPC_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.rpc_url);

        let chain_id = env::var("CHAIN_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.chain_id);

        let factory_address = match env::var("FACTORY_ADDRESS").ok().filter(|s| !s.is_empty()) {
            Some(raw) => parse_address("FACTORY_ADDRESS", &raw)?,
            None => defaults.factory_address,
        };

        let ens_rpc_url = env::var("ENS_RPC_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.ens_rpc_url);

        let ens_enabled = match env::var("ENS_ENABLED").ok().filter(|s| !s.is_empty()) {
            Some(raw) => parse_bool("ENS_ENABLED", &raw)?,
            None => defaults.ens_enabled,
        };

        let price_api_url = env::var("PRICE_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.price_api_url);

        let read_timeout = env::var("READ_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.read_timeout);

        let private_key = env::var("PRIVATE_KEY").ok().filter(|s| !s.is_empty());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.server_port);

        let rate_refresh_seconds = env::var("RATE_REFRESH_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_refresh_seconds);

        let config = Self {
            rpc_url,
            chain_id,
            factory_address,
            ens_rpc_url,
            ens_enabled,
            price_api_url,
            read_timeout,
            private_key,
            server_port,
            rate_refresh_seconds,
        };
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that would stall reads or spin the rate refresh
    pub fn validate(&self) -> Result<()> {
        if self.read_timeout.is_zero() {
            anyhow::bail!("READ_TIMEOUT_MS must be greater than zero");
        }
        if self.rate_refresh_seconds == 0 {
            anyhow::bail!("RATE_REFRESH_SECONDS must be greater than zero");
        }
        Ok(())
    }

    /// Check if transactions can be signed
    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }
}

fn parse_address(name: &str, raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .with_context(|| format!("{} is not a valid address: {}", name, raw))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be true or false, got: {}", name, raw),
    }
}

/// Network constants for the deployed contracts
pub struct ChainConstants;

impl ChainConstants {
    pub const BASE_SEPOLIA_RPC: &'static str = "https://sepolia.base.org";
    pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;
    pub const MAINNET_RPC: &'static str = "https://eth.llamarpc.com";
    pub const PRICE_API_URL: &'static str =
        "https://min-api.cryptocompare.com/data/price?fsym=ETH&tsyms=USD";
    pub const SITE_URL: &'static str = "https://www.betswithfriends.fun";

    /// Bet factory on Base Sepolia
    pub const DEFAULT_FACTORY: Address =
        alloy::primitives::address!("124044BebDfB90ef3BC544bD6429D407bcF69533");

    /// ENS registry, same address on every network ENS is deployed to
    pub const ENS_REGISTRY: Address =
        alloy::primitives::address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_base_sepolia() {
        let config = Config::default();
        assert_eq!(config.chain_id, 84532);
        assert_eq!(config.factory_address, ChainConstants::DEFAULT_FACTORY);
        assert!(!config.can_sign());
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("FACTORY_ADDRESS", "0x1234").is_err());
        let parsed = parse_address("FACTORY_ADDRESS", " 0x124044BebDfB90ef3BC544bD6429D407bcF69533 ").unwrap();
        assert_eq!(parsed, ChainConstants::DEFAULT_FACTORY);
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert!(Config::default().validate().is_ok());

        let spinning = Config { rate_refresh_seconds: 0, ..Config::default() };
        let err = spinning.validate().unwrap_err();
        assert!(err.to_string().contains("RATE_REFRESH_SECONDS"));

        let stalled = Config { read_timeout: Duration::ZERO, ..Config::default() };
        assert!(stalled.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("ENS_ENABLED", "true").unwrap());
        assert!(parse_bool("ENS_ENABLED", " ON ").unwrap());
        assert!(!parse_bool("ENS_ENABLED", "0").unwrap());
        assert!(!parse_bool("ENS_ENABLED", "False").unwrap());
        assert!(parse_bool("ENS_ENABLED", "maybe").is_err());
    }
}
