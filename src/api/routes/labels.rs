//! Address label endpoint

use crate::board::format::format_label;
use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LabelQuery {
    pub address: String,
    /// Already-resolved name, if the caller has one
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label: String,
}

/// Format an address for display. Total over any input.
pub async fn get_label(Query(query): Query<LabelQuery>) -> Json<LabelResponse> {
    Json(LabelResponse {
        label: format_label(&query.address, query.name.as_deref()),
    })
}
