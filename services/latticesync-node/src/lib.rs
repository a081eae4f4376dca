//! LatticeSync node service.
//!
//! HTTP transport for the federation protocol: three verbs plus a health
//! probe. The router is exposed as a library so integration tests can
//! drive it without binding a socket.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// Build the service router over shared application state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/discover", get(handlers::discover))
        .route("/manifest", post(handlers::register_manifest))
        .route("/sync", post(handlers::sync))
        .with_state(state)
}
