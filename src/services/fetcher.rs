//! Concurrent bet reads with per-address failure isolation

use crate::rpc::{ChainReader, FetchError};
use crate::types::BetRecord;
use alloy::primitives::Address;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of reading a batch of bet addresses
#[derive(Debug, Default)]
pub struct FetchBatch {
    /// Successfully decoded bets, in input order
    pub records: Vec<BetRecord>,
    /// Addresses that could not be read and why
    pub failed: Vec<(Address, FetchError)>,
}

/// Reads bets through a [`ChainReader`], one attempt per address
pub struct BetFetcher<R> {
    reader: R,
    read_timeout: Duration,
}

impl<R: ChainReader> BetFetcher<R> {
    pub fn new(reader: R, read_timeout: Duration) -> Self {
        Self { reader, read_timeout }
    }

    /// Enumerate the factory's bets
    pub async fn bet_addresses(&self, factory: Address) -> Result<Vec<Address>, FetchError> {
        match timeout(self.read_timeout, self.reader.bet_addresses(factory)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.read_timeout)),
        }
    }

    /// Read one bet, bounded by the read timeout
    pub async fn fetch_bet(&self, address: Address) -> Result<BetRecord, FetchError> {
        match timeout(self.read_timeout, self.reader.read_bet(address)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.read_timeout)),
        }
    }

    /// Read every address concurrently. Failures are logged and reported in
    /// `failed`; they never abort the batch.
    pub async fn fetch_bets(&self, addresses: &[Address]) -> FetchBatch {
        let reads = addresses.iter().map(|&address| async move {
            let result = self.fetch_bet(address).await;
            (address, result)
        });

        let mut batch = FetchBatch::default();
        for (address, result) in join_all(reads).await {
            match result {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    warn!("[Fetch] skipping bet {:?}: {}", address, e);
                    batch.failed.push((address, e));
                }
            }
        }

        debug!(
            "[Fetch] read {} of {} bets ({} failed)",
            batch.records.len(),
            addresses.len(),
            batch.failed.len()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::DecodeError;
    use crate::types::BetStatus;
    use alloy::primitives::U256;
    use std::collections::HashMap;

    struct MockChain {
        bets: HashMap<Address, BetRecord>,
        slow: Option<Address>,
    }

    impl ChainReader for MockChain {
        async fn bet_addresses(&self, _factory: Address) -> Result<Vec<Address>, FetchError> {
            Ok(self.bets.keys().copied().collect())
        }

        async fn read_bet(&self, bet: Address) -> Result<BetRecord, FetchError> {
            if self.slow == Some(bet) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.bets
                .get(&bet)
                .cloned()
                .ok_or(FetchError::Decode(DecodeError::Abi("empty response".to_string())))
        }
    }

    fn addr(n: u8) -> Address {
        let mut raw = [0u8; 20];
        raw[19] = n;
        Address::from(raw)
    }

    fn record(n: u8) -> BetRecord {
        BetRecord {
            address: addr(n),
            better1: addr(100),
            better2: addr(101),
            decider: addr(102),
            wager: U256::from(1u64),
            conditions: format!("bet {}", n),
            status: BetStatus::Unfunded,
            winner: None,
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_batch() {
        let bets = [1, 2, 3, 5].into_iter().map(|n| (addr(n), record(n))).collect();
        let fetcher = BetFetcher::new(MockChain { bets, slow: None }, Duration::from_secs(1));

        let addresses: Vec<Address> = (1..=5).map(addr).collect();
        let batch = fetcher.fetch_bets(&addresses).await;

        assert_eq!(batch.records.len(), 4);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].0, addr(4));
        // Input order survives the concurrent join
        let order: Vec<Address> = batch.records.iter().map(|r| r.address).collect();
        assert_eq!(order, vec![addr(1), addr(2), addr(3), addr(5)]);
    }

    #[tokio::test]
    async fn test_slow_read_times_out() {
        let bets = [1, 2].into_iter().map(|n| (addr(n), record(n))).collect();
        let fetcher = BetFetcher::new(
            MockChain { bets, slow: Some(addr(2)) },
            Duration::from_millis(50),
        );

        let batch = fetcher.fetch_bets(&[addr(1), addr(2)]).await;
        assert_eq!(batch.records.len(), 1);
        assert!(matches!(batch.failed[0].1, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = BetFetcher::new(
            MockChain { bets: HashMap::new(), slow: None },
            Duration::from_secs(1),
        );
        let batch = fetcher.fetch_bets(&[]).await;
        assert!(batch.records.is_empty());
        assert!(batch.failed.is_empty());
    }
}
