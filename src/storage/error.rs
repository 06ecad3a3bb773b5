//! Storage error types
//!
//! Defines all errors that can occur in the entry store.

use thiserror::Error;

/// Errors that can occur in the entry store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite returned an error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored JSON could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Requested entry does not exist
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// A date or month string failed to parse
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
