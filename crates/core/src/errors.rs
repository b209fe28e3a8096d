//! Error types shared across the Doorstep crates.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for domain and storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A payload failed domain validation before leaving the device.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected invariant breaks.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage-layer failure classes surfaced through [`Error::Database`].
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    PoolError(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}
