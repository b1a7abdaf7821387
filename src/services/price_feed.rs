//! ETH/USD price feed
//!
//! Keeps the last successfully fetched rate. A failed fetch is logged and the
//! previous value (zero before the first success) stays in effect.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Shared, last-known-value exchange rate
#[derive(Clone)]
pub struct PriceFeed {
    client: reqwest::Client,
    url: String,
    rate: Arc<RwLock<Decimal>>,
}

impl PriceFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("bets-with-friends")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
            rate: Arc::new(RwLock::new(Decimal::ZERO)),
        }
    }

    /// Current rate without touching the network
    pub async fn current(&self) -> Decimal {
        *self.rate.read().await
    }

    /// Try to fetch a fresh rate and return whichever rate is now in effect
    pub async fn refresh(&self) -> Decimal {
        match self.fetch_rate().await {
            Ok(rate) => {
                *self.rate.write().await = rate;
                debug!("[Price] ETH/USD = {}", rate);
                rate
            }
            Err(e) => {
                let kept = self.current().await;
                warn!("[Price] rate fetch failed, keeping {}: {:#}", kept, e);
                kept
            }
        }
    }

    /// Refresh the rate forever
    pub async fn run(&self, interval: Duration) {
        info!("Price feed started (interval: {:?})", interval);

        loop {
            self.refresh().await;
            tokio::time::sleep(interval).await;
        }
    }

    async fn fetch_rate(&self) -> Result<Decimal> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Price API request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Price API error {}", response.status());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse price response")?;

        parse_usd_rate(&body)
    }
}

/// Extract the `USD` field of a `{"USD": 1234.5}` response
fn parse_usd_rate(body: &serde_json::Value) -> Result<Decimal> {
    let usd = match body.get("USD") {
        Some(serde_json::Value::Number(n)) => n,
        _ => anyhow::bail!("No USD price in response: {}", body),
    };

    let rate = Decimal::from_str(&usd.to_string())
        .or_else(|_| Decimal::from_scientific(&usd.to_string()))
        .context("USD price is not a decimal")?;

    if rate <= Decimal::ZERO {
        anyhow::bail!("Non-positive USD price: {}", rate);
    }

    Ok(rate)
}
