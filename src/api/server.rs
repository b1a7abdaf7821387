//! Axum server setup and configuration

use crate::api::routes;
use crate::services::PriceFeed;
use crate::{Config, LiveBoard};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub board: Arc<LiveBoard>,
    /// Refreshed in the background by the server binary
    pub price_feed: PriceFeed,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let board = LiveBoard::from_config(&config);
        let price_feed = PriceFeed::new(config.price_api_url.clone(), config.read_timeout);

        Self {
            config: Arc::new(config),
            board: Arc::new(board),
            price_feed,
        }
    }
}

/// Create the Axum application with all routes
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/bets", get(routes::bets::list_bets))
        .route("/bets/:address", get(routes::bets::get_bet))
        .route("/rate", get(routes::rate::get_rate))
        .route("/label", get(routes::labels::get_label));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
