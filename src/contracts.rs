//! Bet and BetFactory contract bindings
//!
//! Read calls are ABI-encoded here and sent through [`crate::rpc::RpcClient`];
//! write calls go through the `#[sol(rpc)]` instances in [`crate::executor`].
//! The raw `bet()` tuple never leaves this module: it is decoded into a
//! [`BetRecord`] immediately.

use crate::types::{BetRecord, BetStatus};
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use thiserror::Error;

sol! {
    #[sol(rpc)]
    interface IBet {
        event BetCreated(address better1, address better2, address decider, uint256 wager, string conditions);
        event BetFunded(address funder, uint256 amount);
        event BetFullyFunded();
        event BetResolved(address winner);
        event BetInvalidated();
        event BetCancelled(address canceller);

        function bet() external view returns (
            address better1,
            address better2,
            address decider,
            uint256 wager,
            string conditions,
            uint8 status,
            address winner
        );

        function fundBet() external payable;
        function cancelBet() external;
        function invalidateBet() external;
        function resolveBet(address _winner) external;
    }

    #[sol(rpc)]
    interface IBetFactory {
        event BetCreated(address betAddress, address better1, address better2, address decider, uint256 wager, string conditions);

        function getBets() external view returns (address[] memory);

        function createBet(
            address _better1,
            address _better2,
            address _decider,
            uint256 _wager,
            string _conditions
        ) external;
    }
}

/// Why a contract response could not be turned into a typed value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("ABI decode failed: {0}")]
    Abi(String),
    #[error("unknown bet status {0}")]
    UnknownStatus(u8),
    #[error("bet has zero wager")]
    ZeroWager,
    #[error("resolved bet winner {0} is not one of the betters")]
    WinnerNotBetter(Address),
}

/// Calldata for `IBetFactory.getBets()`
pub fn get_bets_calldata() -> Vec<u8> {
    IBetFactory::getBetsCall {}.abi_encode()
}

/// Calldata for `IBet.bet()`
pub fn bet_calldata() -> Vec<u8> {
    IBet::betCall {}.abi_encode()
}

/// Decode the `getBets()` return data
pub fn decode_bet_addresses(data: &[u8]) -> Result<Vec<Address>, DecodeError> {
    IBetFactory::getBetsCall::abi_decode_returns(data).map_err(|e| DecodeError::Abi(e.to_string()))
}

/// Decode the `bet()` return data of the contract at `address`
pub fn decode_bet(address: Address, data: &[u8]) -> Result<BetRecord, DecodeError> {
    let raw = IBet::betCall::abi_decode_returns(data).map_err(|e| DecodeError::Abi(e.to_string()))?;

    let status = BetStatus::from_code(raw.status).ok_or(DecodeError::UnknownStatus(raw.status))?;

    if raw.wager.is_zero() {
        return Err(DecodeError::ZeroWager);
    }

    let winner = match status {
        BetStatus::Resolved => {
            if raw.winner != raw.better1 && raw.winner != raw.better2 {
                return Err(DecodeError::WinnerNotBetter(raw.winner));
            }
            Some(raw.winner)
        }
        _ => None,
    };

    Ok(BetRecord {
        address,
        better1: raw.better1,
        better2: raw.better2,
        decider: raw.decider,
        wager: raw.wager,
        conditions: raw.conditions,
        status,
        winner,
    })
}
