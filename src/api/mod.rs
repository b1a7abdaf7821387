//! Web API module for the bet board
//!
//! Read-only JSON endpoints over the listing, rate and label operations.

pub mod routes;
pub mod server;

pub use server::{create_app, AppState};
