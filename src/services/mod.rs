//! Services behind the bet board: fetching, names, prices and transactions

pub mod fetcher;
pub mod listing;
pub mod names;
pub mod price_feed;
pub mod tx_errors;

pub use fetcher::{BetFetcher, FetchBatch};
pub use listing::{ListingParams, ListingSession, RefreshOutcome};
pub use names::{EnsResolver, NameResolver, Names, NoNames};
pub use price_feed::PriceFeed;
pub use tx_errors::{TxAction, TxError};
