//! Route handlers for the HTTP API.

pub mod analytics;
pub mod health;
pub mod loads;
pub mod negotiations;

use axum::routing::{get, post};
use axum::Router;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Routes that require the `X-API-Key` header.
pub fn protected() -> Router<AppState> {
    Router::new()
        // Call ingestion and dashboard views
        .route("/api/analytics/calls", post(analytics::ingest_call))
        .route("/api/analytics/calls/:call_id", get(analytics::get_call))
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/operations", get(analytics::operations))
        .route("/api/analytics/negotiations", get(analytics::negotiations))
        .route("/api/analytics/carriers", get(analytics::carriers))
        .route("/api/analytics/geography", get(analytics::geography))
        .route("/api/analytics/ai-quality", get(analytics::ai_quality))
        // Loads
        .route("/api/loads/search", get(loads::search))
        .route("/api/loads/:load_id", get(loads::get_load))
        // Negotiation
        .route("/api/negotiations/evaluate", post(negotiations::evaluate))
}

/// Routes open to unauthenticated callers.
pub fn public() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}

/// Treat an empty or whitespace-only query value as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional numeric query value; empty means absent.
pub(crate) fn parse_number(name: &str, value: Option<String>) -> Result<Option<f64>> {
    non_empty(value)
        .map(|v| {
            v.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| ApiError::BadRequest(format!("{} must be a number, got {:?}", name, v)))
        })
        .transpose()
}
