//! SQLite connection pool and configuration.
//!
//! The persistence layer is a single embedded SQLite database in WAL mode
//! (§6), read and written only by the simulation process itself. Uses
//! [`sqlx`] with runtime query construction (not compile-time checked) to
//! avoid requiring the database file to exist at build time. All queries
//! are parameterized to prevent SQL injection.

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool as SqlxSqlitePool;

use crate::error::DbError;

/// Default maximum number of connections in the pool.
///
/// A single-writer simulation process needs few concurrent connections;
/// this mostly allows one writer plus a handful of read-only queries
/// (the HTTP companion surface) to proceed without blocking each other.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection acquire timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file on disk.
    pub db_path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connection acquire timeout.
    pub connect_timeout: Duration,
}

impl SqliteConfig {
    /// Create a new configuration for the database file at `db_path`.
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection acquire timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Connection pool handle to the colony's SQLite database.
///
/// Wraps a [`sqlx::SqlitePool`] and provides access to the resident,
/// event, world-state, and board store operations.
#[derive(Clone)]
pub struct SqlitePool {
    pool: SqlxSqlitePool,
}

impl SqlitePool {
    /// Connect to the database file described by `config`, creating it if
    /// it does not already exist, and enable WAL mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the connection fails.
    pub async fn connect(config: &SqliteConfig) -> Result<Self, DbError> {
        let connect_options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await?;

        tracing::info!(db_path = %config.db_path, "connected to SQLite database");

        Ok(Self { pool })
    }

    /// Connect using a database file path with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection fails.
    pub async fn connect_path(db_path: &str) -> Result<Self, DbError> {
        Self::connect(&SqliteConfig::new(db_path)).await
    }

    /// Open an in-memory database, useful for tests.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection fails.
    pub async fn connect_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Run all pending migrations from the `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying [`sqlx::SqlitePool`].
    #[must_use]
    pub const fn pool(&self) -> &SqlxSqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}
