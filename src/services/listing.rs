//! Last-write-wins listing session
//!
//! Holds the current inputs (bet addresses and viewer) and the most recent
//! listing built from them. A refresh that finishes after its inputs were
//! replaced is dropped, so the published listing always matches the inputs
//! that were current when it was published.

use crate::board::BetBoard;
use crate::rpc::ChainReader;
use crate::services::names::NameResolver;
use crate::types::{BetListing, ViewContext};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Inputs a listing is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub addresses: Vec<Address>,
    pub viewer: Address,
    generation: u64,
}

impl ListingParams {
    /// Bumped every time the inputs change
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a refresh
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Listing matched the current inputs and was published
    Published(Arc<BetListing>),
    /// Inputs changed while the batch was in flight; the result was discarded
    Superseded,
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published(_))
    }
}

pub struct ListingSession {
    params: watch::Sender<ListingParams>,
    published: watch::Sender<Option<Arc<BetListing>>>,
}

impl ListingSession {
    pub fn new(addresses: Vec<Address>, viewer: Address) -> Self {
        let (params, _) = watch::channel(ListingParams {
            addresses,
            viewer,
            generation: 0,
        });
        let (published, _) = watch::channel(None);
        Self { params, published }
    }

    /// Replace the inputs. Identical inputs leave in-flight refreshes valid.
    pub fn set_params(&self, addresses: Vec<Address>, viewer: Address) -> bool {
        let changed = self.params.send_if_modified(|current| {
            if current.addresses == addresses && current.viewer == viewer {
                return false;
            }
            current.addresses = addresses;
            current.viewer = viewer;
            current.generation += 1;
            true
        });

        if changed {
            debug!("[Listing] inputs changed (generation {})", self.params.borrow().generation);
        }
        changed
    }

    pub fn set_addresses(&self, addresses: Vec<Address>) -> bool {
        let viewer = self.params.borrow().viewer;
        self.set_params(addresses, viewer)
    }

    pub fn set_viewer(&self, viewer: Address) -> bool {
        let addresses = self.params.borrow().addresses.clone();
        self.set_params(addresses, viewer)
    }

    pub fn params(&self) -> ListingParams {
        self.params.borrow().clone()
    }

    /// Most recent published listing, if any
    pub fn latest(&self) -> Option<Arc<BetListing>> {
        self.published.borrow().clone()
    }

    /// Notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<BetListing>>> {
        self.published.subscribe()
    }

    /// Build a listing for the current inputs and publish it unless the
    /// inputs change before it is done
    pub async fn refresh<R, N>(&self, board: &BetBoard<R, N>, rate: Decimal) -> RefreshOutcome
    where
        R: ChainReader,
        N: NameResolver,
    {
        let mut changes = self.params.subscribe();
        let params = changes.borrow_and_update().clone();
        let ctx = ViewContext::new(params.viewer, rate);

        let listing = tokio::select! {
            listing = board.list_addresses(&params.addresses, ctx) => listing,
            _ = changes.changed() => {
                info!("[Listing] inputs changed mid-refresh, abandoning generation {}", params.generation);
                return RefreshOutcome::Superseded;
            }
        };

        self.publish(&params, listing)
    }

    fn publish(&self, params: &ListingParams, listing: BetListing) -> RefreshOutcome {
        // Held across the send so inputs cannot change between check and publish
        let current = self.params.borrow();
        if current.generation != params.generation {
            info!(
                "[Listing] dropping stale listing (generation {} != {})",
                params.generation, current.generation
            );
            return RefreshOutcome::Superseded;
        }

        let listing = Arc::new(listing);
        self.published.send_replace(Some(listing.clone()));
        RefreshOutcome::Published(listing)
    }
}
