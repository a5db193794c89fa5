//! Error types for the persistence layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A SQLite operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// A database migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row referenced an enum or id value this build does not recognize.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// The table the offending row was read from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A configuration error, such as an unparsable database URL.
    #[error("configuration error: {0}")]
    Config(String),
}
