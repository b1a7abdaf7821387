//! JSON-RPC `eth_call` client and the chain-reader seam
//!
//! Contract reads are plain `eth_call`s posted with reqwest; the
//! [`ChainReader`] trait lets the fetcher run against a mock chain in tests.

use crate::contracts::{self, DecodeError};
use crate::types::BetRecord;
use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a single bet read failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("RPC request failed: {0}")]
    Transport(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("read timed out after {0:?}")]
    Timeout(Duration),
}

/// Read access to the factory and bet contracts
pub trait ChainReader: Send + Sync {
    /// Addresses of every bet the factory has created
    fn bet_addresses(&self, factory: Address) -> impl Future<Output = Result<Vec<Address>, FetchError>> + Send;

    /// Full state of one bet
    fn read_bet(&self, bet: Address) -> impl Future<Output = Result<BetRecord, FetchError>> + Send;
}

/// Minimal JSON-RPC client for `eth_call`
#[derive(Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a read-only call against `to` at the latest block
    pub async fn eth_call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>, FetchError> {
        let rpc_payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [{
                "to": format!("{:?}", to),
                "data": format!("0x{}", hex::encode(calldata)),
            }, "latest"],
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&rpc_payload)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| FetchError::Transport(format!("invalid JSON response: {}", e)))?;

        parse_call_result(&json)
    }

    /// Chain ID reported by the node, used to sanity-check configuration
    pub async fn chain_id(&self) -> Result<u64> {
        let rpc_payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
            "id": 1
        });

        let json: serde_json::Value = self
            .client
            .post(&self.url)
            .json(&rpc_payload)
            .send()
            .await
            .context("RPC call failed")?
            .json()
            .await
            .context("Failed to parse RPC response")?;

        if let Some(error) = json.get("error") {
            anyhow::bail!("RPC error: {}", error);
        }

        let result = json["result"].as_str().unwrap_or("0x0");
        let hex_str = result.strip_prefix("0x").unwrap_or(result);
        u64::from_str_radix(hex_str, 16).context("Invalid chain ID in RPC response")
    }
}

impl ChainReader for RpcClient {
    async fn bet_addresses(&self, factory: Address) -> Result<Vec<Address>, FetchError> {
        let data = self.eth_call(factory, &contracts::get_bets_calldata()).await?;
        let addresses = contracts::decode_bet_addresses(&data)?;
        debug!("[RPC] factory {:?} lists {} bets", factory, addresses.len());
        Ok(addresses)
    }

    async fn read_bet(&self, bet: Address) -> Result<BetRecord, FetchError> {
        let data = self.eth_call(bet, &contracts::bet_calldata()).await?;
        Ok(contracts::decode_bet(bet, &data)?)
    }
}

/// Pull the hex `result` out of a JSON-RPC response
fn parse_call_result(json: &serde_json::Value) -> Result<Vec<u8>, FetchError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(FetchError::Rpc(message));
    }

    let result = json
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| FetchError::Rpc("response has no result".to_string()))?;

    let hex_str = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(hex_str).map_err(|e| FetchError::Rpc(format!("result is not hex: {}", e)))
}
