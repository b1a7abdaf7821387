//! Partition a viewer's bets into unfunded, active and historical buckets

use crate::types::{BetRecord, BetStatus};
use alloy::primitives::Address;
use serde::Serialize;

/// Which list a bet is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    /// Waiting on one or both betters to fund
    Unfunded,
    /// Fully funded, waiting on the decider
    Active,
    /// Resolved or invalidated
    Historical,
}

impl Bucket {
    pub fn for_status(status: BetStatus) -> Self {
        match status {
            BetStatus::Unfunded | BetStatus::Better1Funded | BetStatus::Better2Funded => {
                Bucket::Unfunded
            }
            BetStatus::FullyFunded => Bucket::Active,
            BetStatus::Resolved | BetStatus::Invalidated => Bucket::Historical,
        }
    }
}

/// A viewer's bets, bucketed by lifecycle state. Input order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub unfunded: Vec<BetRecord>,
    pub active: Vec<BetRecord>,
    pub historical: Vec<BetRecord>,
}

impl Buckets {
    pub fn len(&self) -> usize {
        self.unfunded.len() + self.active.len() + self.historical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active bets the viewer is expected to resolve or invalidate
    pub fn awaiting_decision(&self, viewer: Address) -> impl Iterator<Item = &BetRecord> {
        self.active.iter().filter(move |bet| bet.can_decide(viewer))
    }

    /// Unfunded bets the viewer can still fund
    pub fn awaiting_funding(&self, viewer: Address) -> impl Iterator<Item = &BetRecord> {
        self.unfunded.iter().filter(move |bet| bet.can_fund(viewer))
    }
}

/// Keep the bets `viewer` takes part in and bucket them.
///
/// Bets where the viewer is neither a better nor the decider are dropped.
/// A decider sees unfunded bets too.
pub fn classify<I>(records: I, viewer: Address) -> Buckets
where
    I: IntoIterator<Item = BetRecord>,
{
    let mut buckets = Buckets::default();

    for record in records.into_iter().filter(|r| r.involves(viewer)) {
        match Bucket::for_status(record.status) {
            Bucket::Unfunded => buckets.unfunded.push(record),
            Bucket::Active => buckets.active.push(record),
            Bucket::Historical => buckets.historical.push(record),
        }
    }

    buckets
}
