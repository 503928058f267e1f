//! Durable didhub backend using [SQLite](https://sqlite.org), through [sqlx](https://github.com/launchbadge/sqlx).
//!
//! The schema lives in `migrations/` and is applied on connect. JSON payloads
//! are stored as TEXT and timestamps as unix nanoseconds, so ordering by
//! timestamp is an integer comparison. Ties fall back to `rowid`, which
//! follows insertion order.
//!
//! Unlike the in-memory backend, the system log is never truncated
//! automatically.

use std::str::FromStr;

use didhub_core::store::{Backend, StoreError};
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::debug;

mod data;
mod identifier_store;
mod log_store;
mod resolution_store;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Pool size used for file-backed databases.
const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database at `url`, creating it if missing, and runs migrations.
    ///
    /// In-memory URLs (`sqlite::memory:`) get a single long-lived connection,
    /// since every new connection would otherwise open a separate, empty database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::InvalidInput(e.to_string()))?
            .create_if_missing(true);

        let pool = if is_in_memory(url) {
            debug!("opening in-memory database");

            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            debug!("opening database {}", url);

            SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await
        }
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, running any pending migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl Backend for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }
}
