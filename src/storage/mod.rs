//! Storage module for persisting extracted records
//!
//! This module handles all database operations for the crawler:
//! - SQLite database initialization and schema creation
//! - Appending repository records, one durable insert each
//! - Read-back helpers for inspecting a finished crawl

mod schema;
mod sqlite;
mod traits;

pub use schema::REPOSITORIES_TABLE;
pub use sqlite::SqliteStorage;
pub use traits::{RecordStore, StorageError, StorageResult};

/// Opens or creates the record store at `location`
///
/// `location` is a file path, or `:memory:` for a store that lives only as
/// long as the process.
pub fn open_storage(location: &str) -> StorageResult<SqliteStorage> {
    SqliteStorage::open(location)
}
