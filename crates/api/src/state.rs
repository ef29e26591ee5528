//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Expected `X-API-Key` value.
    pub api_key: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            db,
            api_key: api_key.into(),
        }
    }
}
