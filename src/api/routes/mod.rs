//! API route handlers

pub mod bets;
pub mod labels;
pub mod rate;

use alloy::primitives::Address;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: error.into() }))
}

/// Parse an address parameter or answer 400
pub(crate) fn parse_address(field: &str, raw: &str) -> Result<Address, (StatusCode, Json<ErrorResponse>)> {
    raw.trim()
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Invalid {}: {}", field, raw)))
}
