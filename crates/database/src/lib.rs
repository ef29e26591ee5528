//! SQLite persistence layer for the carrier load service.
//!
//! This crate stores loads and voice-agent call records using SQLx with
//! SQLite, and runs the aggregate queries behind the analytics dashboard.
//!
//! # Example
//!
//! ```no_run
//! use database::{load, Database, LoadSearch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:carrier_loads.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let now = chrono::Utc::now().naive_utc();
//!     let loads = load::search_loads(db.pool(), &LoadSearch::default(), now).await?;
//!     println!("{} loads available", loads.len());
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod call_record;
pub mod error;
pub mod load;
pub mod models;
pub mod query;

pub use error::{DatabaseError, Result};
pub use load::LoadSearch;
pub use models::StoredCallRecord;
pub use query::DateRange;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Analytics views fan out several queries per request.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/loads.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases are private to each connection, so they are
    /// limited to a single pooled connection.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_size = if url.contains(":memory:") { 1 } else { pool_size };

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, sample_call, sample_load, test_db};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = test_db().await;
        db.migrate().await.unwrap();

        assert_eq!(load::count_loads(db.pool()).await.unwrap(), 0);
        assert_eq!(call_record::count_call_records(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_loads_and_calls_share_a_database() {
        let db = test_db().await;
        load::upsert_load(db.pool(), &sample_load("LD-001", "Chicago, IL", "Dallas, TX"))
            .await
            .unwrap();
        call_record::upsert_call_record(
            db.pool(),
            &sample_call("call-1", "LD-001"),
            at("2026-02-13T10:00:00"),
        )
        .await
        .unwrap();

        let pressure = call_record::call_pressure(db.pool(), &["LD-001".to_string()])
            .await
            .unwrap();
        assert_eq!(pressure["LD-001"].total_calls, 1);

        db.close().await;
        assert!(db.pool().is_closed());
    }
}
