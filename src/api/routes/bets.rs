//! Bet listing API endpoints

use super::{api_error, parse_address, ErrorResponse};
use crate::api::server::AppState;
use crate::board::format::share_text;
use crate::types::{BetListing, DisplayBet, ViewContext};
use alloy::primitives::Address;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Query parameters for listing bets
#[derive(Debug, Deserialize)]
pub struct ListBetsQuery {
    /// Viewing account
    pub account: String,
}

/// Query parameters for a single bet
#[derive(Debug, Deserialize)]
pub struct GetBetQuery {
    /// Account whose outcome and actions are shown (optional)
    pub viewer: Option<String>,
}

/// Single bet response
#[derive(Debug, Serialize)]
pub struct BetResponse {
    pub bet: DisplayBet,
    pub share_text: String,
}

/// List the account's bets in three buckets with statistics
pub async fn list_bets(
    State(state): State<AppState>,
    Query(query): Query<ListBetsQuery>,
) -> Result<Json<BetListing>, (StatusCode, Json<ErrorResponse>)> {
    let viewer = parse_address("account", &query.account)?;
    let rate = state.price_feed.current().await;

    let listing = state
        .board
        .list_bets(state.config.factory_address, ViewContext::new(viewer, rate))
        .await
        .map_err(|e| {
            warn!("[API] listing for {:?} failed: {}", viewer, e);
            api_error(StatusCode::BAD_GATEWAY, format!("Failed to read bet factory: {}", e))
        })?;

    Ok(Json(listing))
}

/// One bet, labelled, with its share text
pub async fn get_bet(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<GetBetQuery>,
) -> Result<Json<BetResponse>, (StatusCode, Json<ErrorResponse>)> {
    let bet = parse_address("bet address", &address)?;
    let viewer = match query.viewer.as_deref() {
        Some(raw) => parse_address("viewer", raw)?,
        None => Address::ZERO,
    };
    let rate = state.price_feed.current().await;

    let bet = state
        .board
        .show_bet(bet, ViewContext::new(viewer, rate))
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, format!("Failed to read bet: {}", e)))?;

    let share_text = share_text(&bet);
    Ok(Json(BetResponse { bet, share_text }))
}
