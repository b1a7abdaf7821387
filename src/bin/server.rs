//! Bets with Friends Web Server
//!
//! JSON API over the bet board for a browser front-end.

use anyhow::{Context, Result};
use bets_with_friends::api::{create_app, AppState};
use bets_with_friends::{Config, RpcClient};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Default to info for this crate; override with RUST_LOG
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bets_with_friends=info,bets_server=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║       BETS WITH FRIENDS - WEB SERVER                         ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Factory: {:<50} ║", format!("{:?}", config.factory_address));
    println!("║  Chain ID: {:<49} ║", config.chain_id);
    println!("║  ENS Names: {:<48} ║", if config.ens_enabled { "ENABLED" } else { "DISABLED" });
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // Warn early if the RPC serves a different chain than configured
    let rpc = RpcClient::new(config.rpc_url.clone(), config.read_timeout);
    match rpc.chain_id().await {
        Ok(id) if id != config.chain_id => {
            warn!("RPC {} reports chain {} but CHAIN_ID is {}", rpc.url(), id, config.chain_id)
        }
        Ok(_) => {}
        Err(e) => warn!("Could not reach RPC {}: {:#}", rpc.url(), e),
    }

    info!("Initializing application state...");
    let state = AppState::new(config.clone());

    // Keep the exchange rate fresh in the background
    let price_feed = state.price_feed.clone();
    let interval = Duration::from_secs(config.rate_refresh_seconds);
    tokio::spawn(async move {
        price_feed.run(interval).await;
    });

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
