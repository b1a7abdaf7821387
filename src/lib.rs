//! Bets with Friends Client Library
//!
//! Reads peer-to-peer bets from the on-chain bet factory and presents them to
//! one viewing account:
//!
//! 1. **Listing**: every bet the viewer is a better or decider on, bucketed
//!    into unfunded, active and historical.
//! 2. **Statistics**: wins, losses, decisions and net profit in ETH and USD.
//!
//! Bet rules live in the contract. This crate only reads state, labels it and
//! submits the contract's write calls.

pub mod api;
pub mod board;
pub mod config;
pub mod contracts;
pub mod executor;
pub mod rpc;
pub mod services;
pub mod types;

pub use board::{BetBoard, Bucket, Buckets};
pub use config::{ChainConstants, Config};
pub use executor::{BetActions, ExecutionResult, NewBet};
pub use rpc::{ChainReader, FetchError, RpcClient};
pub use services::{ListingSession, NameResolver, Names, PriceFeed, TxAction, TxError};
pub use types::{BetListing, BetRecord, BetStats, BetStatus, DisplayBet, Outcome, ViewContext};

/// Board wired to a live RPC endpoint and the configured name resolver
pub type LiveBoard = BetBoard<RpcClient, Names>;
