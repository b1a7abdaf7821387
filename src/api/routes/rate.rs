//! Exchange rate endpoint

use crate::api::server::AppState;
use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// USD per ETH; zero until the first successful fetch
    pub usd: Decimal,
    pub available: bool,
}

/// Last known ETH/USD rate
pub async fn get_rate(State(state): State<AppState>) -> Json<RateResponse> {
    let usd = state.price_feed.current().await;
    Json(RateResponse {
        usd,
        available: !usd.is_zero(),
    })
}
