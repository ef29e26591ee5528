//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use database::Database;

/// API key used when `API_KEY` is not set.
pub const DEFAULT_API_KEY: &str = "changeme";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
    /// Maximum pooled database connections.
    pub pool_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BROKER_API_ADDR` | Server bind address | `127.0.0.1:8000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:carrier_loads.db?mode=rwc` |
    /// | `API_KEY` | Shared secret for `X-API-Key` | `changeme` |
    /// | `DATABASE_POOL_SIZE` | Database pool size | `20` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BROKER_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:carrier_loads.db?mode=rwc".to_string());

        let api_key = env::var("API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());

        let pool_size = match env::var("DATABASE_POOL_SIZE") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize(value))?,
            Err(_) => Database::DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            addr,
            database_url,
            api_key,
            pool_size,
        })
    }

    /// Whether the API key was left at its well-known default.
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BROKER_API_ADDR format")]
    InvalidAddr,

    #[error("Invalid DATABASE_POOL_SIZE: {0}")]
    InvalidPoolSize(String),
}
