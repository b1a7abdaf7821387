//! Core types for the bet board

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a bet, as stored by the bet contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Unfunded,
    Better1Funded,
    Better2Funded,
    FullyFunded,
    Resolved,
    Invalidated,
}

impl BetStatus {
    /// Map the contract's `uint8` status to a typed status
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BetStatus::Unfunded),
            1 => Some(BetStatus::Better1Funded),
            2 => Some(BetStatus::Better2Funded),
            3 => Some(BetStatus::FullyFunded),
            4 => Some(BetStatus::Resolved),
            5 => Some(BetStatus::Invalidated),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            BetStatus::Unfunded => 0,
            BetStatus::Better1Funded => 1,
            BetStatus::Better2Funded => 2,
            BetStatus::FullyFunded => 3,
            BetStatus::Resolved => 4,
            BetStatus::Invalidated => 5,
        }
    }

    /// Resolved and Invalidated bets never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, BetStatus::Resolved | BetStatus::Invalidated)
    }

    /// Still waiting on at least one better to fund
    pub fn is_awaiting_funds(&self) -> bool {
        matches!(
            self,
            BetStatus::Unfunded | BetStatus::Better1Funded | BetStatus::Better2Funded
        )
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Unfunded => write!(f, "Unfunded"),
            BetStatus::Better1Funded => write!(f, "Better 1 Funded"),
            BetStatus::Better2Funded => write!(f, "Better 2 Funded"),
            BetStatus::FullyFunded => write!(f, "Fully Funded"),
            BetStatus::Resolved => write!(f, "Resolved"),
            BetStatus::Invalidated => write!(f, "Invalidated"),
        }
    }
}

/// A bet as read from its contract, decoded at the RPC boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    /// Address of the bet contract itself
    pub address: Address,
    pub better1: Address,
    pub better2: Address,
    pub decider: Address,
    /// Stake each better funds, in wei
    pub wager: U256,
    pub conditions: String,
    pub status: BetStatus,
    /// Only set once the bet is resolved
    pub winner: Option<Address>,
}

impl BetRecord {
    pub fn is_better(&self, account: Address) -> bool {
        self.better1 == account || self.better2 == account
    }

    pub fn is_decider(&self, account: Address) -> bool {
        self.decider == account
    }

    /// Whether the account has any part in this bet
    pub fn involves(&self, account: Address) -> bool {
        self.is_better(account) || self.is_decider(account)
    }

    pub fn is_winner(&self, account: Address) -> bool {
        self.status == BetStatus::Resolved && self.winner == Some(account)
    }

    /// Resolved against this account while it was one of the betters
    pub fn is_loser(&self, account: Address) -> bool {
        self.status == BetStatus::Resolved && self.is_better(account) && self.winner != Some(account)
    }

    /// How this settled bet turned out from the account's point of view
    pub fn outcome_for(&self, account: Address) -> Outcome {
        match self.status {
            BetStatus::Invalidated => Outcome::Invalidated,
            BetStatus::Resolved if self.is_winner(account) => Outcome::Won,
            BetStatus::Resolved if self.is_loser(account) => Outcome::Lost,
            _ => Outcome::Neutral,
        }
    }

    /// The viewer can send `fundBet` for this bet
    pub fn can_fund(&self, account: Address) -> bool {
        self.status.is_awaiting_funds() && self.is_better(account)
    }

    /// The viewer can resolve or invalidate this bet
    pub fn can_decide(&self, account: Address) -> bool {
        self.status == BetStatus::FullyFunded && self.is_decider(account)
    }
}

/// Result of a settled bet for a particular viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Invalidated,
    /// Viewer decided the bet or the bet is not settled
    Neutral,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won => write!(f, "WON"),
            Outcome::Lost => write!(f, "LOST"),
            Outcome::Invalidated => write!(f, "INVALIDATED"),
            Outcome::Neutral => write!(f, "-"),
        }
    }
}

/// Inputs the classifier and aggregator need besides the bets themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub viewer: Address,
    /// USD per ETH, zero until the first successful price fetch
    pub rate: Decimal,
}

impl ViewContext {
    pub fn new(viewer: Address, rate: Decimal) -> Self {
        Self { viewer, rate }
    }
}

/// Per-viewer statistics over settled bets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetStats {
    pub bets_won: u32,
    pub bets_lost: u32,
    pub bets_decided: u32,
    /// Net profit in ETH
    pub pnl: Decimal,
    /// Net profit in USD at the rate of the listing
    pub pnl_fiat: Decimal,
}

impl BetStats {
    pub fn win_rate(&self) -> f64 {
        let settled = self.bets_won + self.bets_lost;
        if settled == 0 {
            0.0
        } else {
            (self.bets_won as f64 / settled as f64) * 100.0
        }
    }
}

/// A bet prepared for display: labels, amounts and viewer-specific flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayBet {
    pub address: Address,
    pub conditions: String,
    pub status: BetStatus,
    pub better1: Address,
    pub better2: Address,
    pub decider: Address,
    pub winner: Option<Address>,
    pub better1_label: String,
    pub better2_label: String,
    pub decider_label: String,
    /// "N/A" until the bet is resolved
    pub winner_label: String,
    /// Wager in wei, as a decimal string
    pub wager_wei: String,
    pub wager_eth: Decimal,
    pub wager_usd: Decimal,
    pub outcome: Outcome,
    pub can_fund: bool,
    pub can_decide: bool,
}

/// Everything a viewer sees: three buckets plus statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetListing {
    pub viewer: Address,
    pub unfunded: Vec<DisplayBet>,
    pub active: Vec<DisplayBet>,
    pub historical: Vec<DisplayBet>,
    pub stats: BetStats,
    /// Rate used for every USD figure in this listing
    pub rate: Decimal,
    /// Addresses dropped because their read failed
    pub failed: usize,
    pub fetched_at: DateTime<Utc>,
}

impl BetListing {
    pub fn total(&self) -> usize {
        self.unfunded.len() + self.active.len() + self.historical.len()
    }

    /// Active bets the viewer has to resolve or invalidate
    pub fn awaiting_decision(&self) -> impl Iterator<Item = &DisplayBet> {
        self.active.iter().filter(|b| b.can_decide)
    }

    /// Unfunded bets still waiting on the viewer's deposit
    pub fn awaiting_funding(&self) -> impl Iterator<Item = &DisplayBet> {
        self.unfunded.iter().filter(|b| b.can_fund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");
    const CAROL: Address = address!("00000000000000000000000000000000000ca401");
    const DAVE: Address = address!("000000000000000000000000000000000000da7e");

    fn record(status: BetStatus, winner: Option<Address>) -> BetRecord {
        BetRecord {
            address: address!("1000000000000000000000000000000000000001"),
            better1: ALICE,
            better2: BOB,
            decider: CAROL,
            wager: U256::from(1_000u64),
            conditions: "Rain tomorrow".to_string(),
            status,
            winner,
        }
    }

    #[test]
    fn test_status_codes_round_trip() {
        for code in 0..=5u8 {
            assert_eq!(BetStatus::from_code(code).unwrap().code(), code);
        }
        assert_eq!(BetStatus::from_code(6), None);
    }

    #[test]
    fn test_outcomes() {
        let resolved = record(BetStatus::Resolved, Some(ALICE));
        assert_eq!(resolved.outcome_for(ALICE), Outcome::Won);
        assert_eq!(resolved.outcome_for(BOB), Outcome::Lost);
        assert_eq!(resolved.outcome_for(CAROL), Outcome::Neutral);

        let invalid = record(BetStatus::Invalidated, None);
        assert_eq!(invalid.outcome_for(ALICE), Outcome::Invalidated);
    }

    #[test]
    fn test_roles() {
        let unfunded = record(BetStatus::Better1Funded, None);
        assert!(unfunded.can_fund(BOB));
        assert!(!unfunded.can_fund(CAROL));
        assert!(unfunded.involves(CAROL));
        assert!(!unfunded.involves(DAVE));

        let active = record(BetStatus::FullyFunded, None);
        assert!(active.can_decide(CAROL));
        assert!(!active.can_decide(ALICE));
        assert!(!active.can_fund(ALICE));
    }

    #[test]
    fn test_win_rate() {
        let stats = BetStats { bets_won: 3, bets_lost: 1, ..Default::default() };
        assert_eq!(stats.win_rate(), 75.0);
        assert_eq!(BetStats::default().win_rate(), 0.0);
    }
}
