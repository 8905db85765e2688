//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::config::MEMORY_DATABASE;
use crate::record::Repository;
use crate::storage::schema::{initialize_schema, REPOSITORIES_TABLE};
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens a store at `location`, which is a path or `:memory:`
    pub fn open(location: &str) -> StorageResult<Self> {
        if location == MEMORY_DATABASE {
            Self::new_in_memory()
        } else {
            Self::new(Path::new(location))
        }
    }

    /// Creates a new SqliteStorage instance backed by a file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Each autocommit insert must reach disk before `store` returns
        conn.execute_batch("PRAGMA synchronous = FULL;")?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened record store at {}", path.display());
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        tracing::debug!("Opened in-memory record store");
        Ok(Self { conn })
    }

    /// Counts the stored rows
    pub fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", REPOSITORIES_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Loads every stored record in insertion order
    pub fn list_records(&self) -> StorageResult<Vec<Repository>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT authority, name, num_stars, num_forks FROM {} ORDER BY rowid",
            REPOSITORIES_TABLE
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(authority, name, stars, forks)| {
                Ok(Repository {
                    num_stars: to_count(stars)?,
                    num_forks: to_count(forks)?,
                    authority,
                    name,
                })
            })
            .collect()
    }
}

impl RecordStore for SqliteStorage {
    fn store(&mut self, record: &Repository) -> StorageResult<()> {
        tracing::debug!("Store {}", record);
        let stars = to_sql_integer(record.num_stars)?;
        let forks = to_sql_integer(record.num_forks)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (authority, name, num_stars, num_forks) VALUES (?1, ?2, ?3, ?4)",
                REPOSITORIES_TABLE
            ),
            params![record.authority, record.name, stars, forks],
        )?;
        Ok(())
    }

    fn close(self) -> StorageResult<()> {
        tracing::info!("Closing record store");
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}

fn to_sql_integer(value: u64) -> StorageResult<i64> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange(value.to_string()))
}

fn to_count(value: i64) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| StorageError::OutOfRange(value.to_string()))
}
