//! Storage error types and their mapping into the core error.

use thiserror::Error;

use doorstep_core::errors::{DatabaseError, Error};

/// Errors raised by the SQLite storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored value: {0}")]
    Corrupt(String),
}

impl From<StorageError> for Error {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Diesel(err) => Error::Database(DatabaseError::QueryFailed(err.to_string())),
            StorageError::Pool(err) => Error::Database(DatabaseError::PoolError(err.to_string())),
            StorageError::Migration(message) => {
                Error::Database(DatabaseError::MigrationFailed(message))
            }
            StorageError::Corrupt(message) => Error::Database(DatabaseError::Internal(message)),
        }
    }
}
