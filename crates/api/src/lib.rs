//! HTTP API for the carrier load service.
//!
//! Serves the voice agent (load search, offer evaluation, call ingestion)
//! and the analytics dashboard. Every route except `/health` requires the
//! shared secret in the `X-API-Key` header.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let protected = routes::protected().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .merge(protected)
        .merge(routes::public())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
