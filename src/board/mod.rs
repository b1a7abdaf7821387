//! Per-viewer bet board: classify, aggregate and label a factory's bets

pub mod classifier;
pub mod format;
pub mod stats;

use crate::config::Config;
use crate::rpc::{ChainReader, FetchError, RpcClient};
use crate::services::fetcher::BetFetcher;
use crate::services::names::{NameResolver, Names};
use crate::types::{BetListing, BetRecord, DisplayBet, ViewContext};
use alloy::primitives::Address;
use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

pub use classifier::{classify, Bucket, Buckets};
pub use format::{format_label, label_for, shorten_address};
pub use stats::aggregate;

/// Shown for the winner of a bet that has none yet
pub const NO_WINNER: &str = "N/A";

/// Reads bets through a [`ChainReader`] and labels them through a [`NameResolver`]
pub struct BetBoard<R, N> {
    fetcher: BetFetcher<R>,
    names: N,
    name_timeout: Duration,
}

impl<R: ChainReader, N: NameResolver> BetBoard<R, N> {
    pub fn new(reader: R, names: N, read_timeout: Duration) -> Self {
        Self {
            fetcher: BetFetcher::new(reader, read_timeout),
            names,
            name_timeout: read_timeout,
        }
    }

    pub fn fetcher(&self) -> &BetFetcher<R> {
        &self.fetcher
    }

    /// Enumerate the factory and build the viewer's listing.
    ///
    /// Failing to enumerate the factory is an error; failing to read
    /// individual bets only drops those bets.
    pub async fn list_bets(&self, factory: Address, ctx: ViewContext) -> Result<BetListing, FetchError> {
        let addresses = self.fetcher.bet_addresses(factory).await?;
        info!("[Board] factory {:?} has {} bets", factory, addresses.len());
        Ok(self.list_addresses(&addresses, ctx).await)
    }

    /// Build the viewer's listing from a known set of bet addresses
    pub async fn list_addresses(&self, addresses: &[Address], ctx: ViewContext) -> BetListing {
        let batch = self.fetcher.fetch_bets(addresses).await;
        let failed = batch.failed.len();

        let buckets = classify(batch.records, ctx.viewer);
        let stats = aggregate(&buckets.historical, &ctx);
        debug!(
            "[Board] {:?}: {} awaiting funding, {} awaiting decision",
            ctx.viewer,
            buckets.awaiting_funding(ctx.viewer).count(),
            buckets.awaiting_decision(ctx.viewer).count()
        );

        let (unfunded, active, historical) = tokio::join!(
            self.display_all(&buckets.unfunded, &ctx),
            self.display_all(&buckets.active, &ctx),
            self.display_all(&buckets.historical, &ctx),
        );

        debug!(
            "[Board] {:?}: {} unfunded, {} active, {} historical",
            ctx.viewer,
            unfunded.len(),
            active.len(),
            historical.len()
        );

        BetListing {
            viewer: ctx.viewer,
            unfunded,
            active,
            historical,
            stats,
            rate: ctx.rate,
            failed,
            fetched_at: Utc::now(),
        }
    }

    /// Read and label a single bet, whether or not the viewer takes part in it
    pub async fn show_bet(&self, bet: Address, ctx: ViewContext) -> Result<DisplayBet, FetchError> {
        let record = self.fetcher.fetch_bet(bet).await?;
        Ok(self.display(&record, &ctx).await)
    }

    /// Label for one address, falling back to the shortened address
    pub async fn label(&self, address: Address) -> String {
        let name = self.lookup(address).await;
        label_for(address, name.as_deref())
    }

    async fn display_all(&self, records: &[BetRecord], ctx: &ViewContext) -> Vec<DisplayBet> {
        join_all(records.iter().map(|record| self.display(record, ctx))).await
    }

    async fn display(&self, record: &BetRecord, ctx: &ViewContext) -> DisplayBet {
        let (better1, better2, decider, winner) = tokio::join!(
            self.lookup(record.better1),
            self.lookup(record.better2),
            self.lookup(record.decider),
            async {
                match record.winner {
                    Some(winner) => self.lookup(winner).await,
                    None => None,
                }
            },
        );

        let winner_label = match record.winner {
            Some(address) => label_for(address, winner.as_deref()),
            None => NO_WINNER.to_string(),
        };

        let wager_eth = format::wei_to_eth(record.wager).unwrap_or(Decimal::ZERO);

        DisplayBet {
            address: record.address,
            conditions: record.conditions.clone(),
            status: record.status,
            better1: record.better1,
            better2: record.better2,
            decider: record.decider,
            winner: record.winner,
            better1_label: label_for(record.better1, better1.as_deref()),
            better2_label: label_for(record.better2, better2.as_deref()),
            decider_label: label_for(record.decider, decider.as_deref()),
            winner_label,
            wager_wei: record.wager.to_string(),
            wager_eth,
            wager_usd: format::to_usd(wager_eth, ctx.rate),
            outcome: record.outcome_for(ctx.viewer),
            can_fund: record.can_fund(ctx.viewer),
            can_decide: record.can_decide(ctx.viewer),
        }
    }

    async fn lookup(&self, address: Address) -> Option<String> {
        timeout(self.name_timeout, self.names.lookup(address))
            .await
            .ok()
            .flatten()
    }
}

impl BetBoard<RpcClient, Names> {
    /// Board on the configured RPC endpoint and name resolver
    pub fn from_config(config: &Config) -> Self {
        BetBoard::new(
            RpcClient::new(config.rpc_url.clone(), config.read_timeout),
            Names::from_config(config),
            config.read_timeout,
        )
    }
}
