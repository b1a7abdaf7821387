//! Win/loss/decision counts and profit-and-loss over settled bets

use crate::board::format::{to_usd, wei_to_eth};
use crate::types::{BetRecord, BetStats, ViewContext};
use alloy::primitives::U256;
use rust_decimal::Decimal;
use tracing::warn;

/// Compute the viewer's statistics over historical bets.
///
/// Wins and losses only count resolved bets. Deciding counts any settled bet
/// the viewer decided, invalidated ones included. Wagers are summed in wei and
/// converted to ETH once.
pub fn aggregate(historical: &[BetRecord], ctx: &ViewContext) -> BetStats {
    let viewer = ctx.viewer;
    let mut stats = BetStats::default();
    let mut won_wei = U256::ZERO;
    let mut lost_wei = U256::ZERO;

    for bet in historical.iter().filter(|b| b.status.is_terminal()) {
        if bet.is_decider(viewer) {
            stats.bets_decided += 1;
        }

        if bet.is_winner(viewer) {
            stats.bets_won += 1;
            won_wei = won_wei.saturating_add(bet.wager);
        } else if bet.is_loser(viewer) {
            stats.bets_lost += 1;
            lost_wei = lost_wei.saturating_add(bet.wager);
        }
    }

    stats.pnl = to_eth_or_zero(won_wei) - to_eth_or_zero(lost_wei);
    stats.pnl_fiat = to_usd(stats.pnl, ctx.rate);
    stats
}

fn to_eth_or_zero(wei: U256) -> Decimal {
    wei_to_eth(wei).unwrap_or_else(|| {
        warn!("[Stats] {} wei does not fit a decimal, counting it as zero", wei);
        Decimal::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BetStatus;
    use alloy::primitives::{address, Address};
    use rust_decimal_macros::dec;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");
    const CAROL: Address = address!("00000000000000000000000000000000000ca401");
    const ONE_ETH: u128 = 1_000_000_000_000_000_000;

    fn settled(status: BetStatus, winner: Option<Address>, wager: u128) -> BetRecord {
        BetRecord {
            address: address!("1000000000000000000000000000000000000001"),
            better1: ALICE,
            better2: BOB,
            decider: CAROL,
            wager: U256::from(wager),
            conditions: "Rain tomorrow".to_string(),
            status,
            winner,
        }
    }

    fn ctx(viewer: Address, rate: Decimal) -> ViewContext {
        ViewContext::new(viewer, rate)
    }

    #[test]
    fn test_winning_one_eth() {
        let bets = vec![settled(BetStatus::Resolved, Some(ALICE), ONE_ETH)];
        let stats = aggregate(&bets, &ctx(ALICE, dec!(2000)));

        assert_eq!(stats.bets_won, 1);
        assert_eq!(stats.bets_lost, 0);
        assert_eq!(stats.bets_decided, 0);
        assert_eq!(stats.pnl, dec!(1));
        assert_eq!(stats.pnl_fiat, dec!(2000));
    }

    #[test]
    fn test_losses_subtract() {
        let bets = vec![
            settled(BetStatus::Resolved, Some(ALICE), ONE_ETH),
            settled(BetStatus::Resolved, Some(ALICE), ONE_ETH / 2),
            settled(BetStatus::Resolved, Some(BOB), ONE_ETH / 4),
        ];
        let stats = aggregate(&bets, &ctx(BOB, dec!(4000)));

        assert_eq!(stats.bets_won, 1);
        assert_eq!(stats.bets_lost, 2);
        assert_eq!(stats.pnl, dec!(-1.25));
        assert_eq!(stats.pnl_fiat, dec!(-5000));
    }

    #[test]
    fn test_invalidated_counts_only_as_decided() {
        let bets = vec![
            settled(BetStatus::Invalidated, None, ONE_ETH),
            settled(BetStatus::Resolved, Some(BOB), ONE_ETH),
        ];

        let decider = aggregate(&bets, &ctx(CAROL, dec!(1)));
        assert_eq!(decider.bets_decided, 2);
        assert_eq!(decider.bets_won + decider.bets_lost, 0);
        assert_eq!(decider.pnl, Decimal::ZERO);

        let better = aggregate(&bets, &ctx(ALICE, dec!(1)));
        assert_eq!(better.bets_lost, 1);
        assert_eq!(better.pnl, dec!(-1));
    }

    #[test]
    fn test_non_terminal_bets_are_ignored() {
        let bets = vec![
            settled(BetStatus::Unfunded, None, ONE_ETH),
            settled(BetStatus::FullyFunded, None, ONE_ETH),
        ];
        assert_eq!(aggregate(&bets, &ctx(CAROL, dec!(1))), BetStats::default());
    }

    #[test]
    fn test_zero_rate_gives_zero_fiat() {
        let bets = vec![settled(BetStatus::Resolved, Some(ALICE), ONE_ETH)];
        let stats = aggregate(&bets, &ctx(ALICE, Decimal::ZERO));
        assert_eq!(stats.pnl, dec!(1));
        assert_eq!(stats.pnl_fiat, Decimal::ZERO);
    }

    #[test]
    fn test_wins_plus_losses_bounded_by_better_bets() {
        let bets = vec![
            settled(BetStatus::Resolved, Some(ALICE), ONE_ETH),
            settled(BetStatus::Resolved, Some(BOB), ONE_ETH),
            settled(BetStatus::Invalidated, None, ONE_ETH),
        ];
        for viewer in [ALICE, BOB, CAROL] {
            let stats = aggregate(&bets, &ctx(viewer, dec!(1)));
            let as_better = bets.iter().filter(|b| b.is_better(viewer)).count() as u32;
            assert!(stats.bets_won + stats.bets_lost <= as_better);
        }
    }
}
