//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::record::Repository;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value out of range: {0}")]
    OutOfRange(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only destination for extracted records
///
/// Every successful `store` is durable by the time it returns. Duplicate
/// records are accepted and kept as separate rows.
pub trait RecordStore {
    /// Appends one record as a new row
    fn store(&mut self, record: &Repository) -> StorageResult<()>;

    /// Releases the store
    ///
    /// Takes the store by value, so it cannot be used or closed again.
    fn close(self) -> StorageResult<()>
    where
        Self: Sized;
}
