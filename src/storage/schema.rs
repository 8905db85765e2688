//! Database schema definitions
//!
//! One fixed table, no keys and no indices.

/// Name of the table holding extracted repositories
pub const REPOSITORIES_TABLE: &str = "repositories";

/// SQL schema for the database
pub fn schema_sql() -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {REPOSITORIES_TABLE} (
    authority TEXT,
    name TEXT,
    num_stars INTEGER,
    num_forks INTEGER
);
"#
    )
}

/// Initializes the database schema
///
/// Safe to run against a database that already holds the table.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&schema_sql())?;
    Ok(())
}
