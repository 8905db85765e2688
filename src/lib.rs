//! Dependents-Crawler: collects the dependent repositories of a package
//!
//! This crate walks a paginated "dependents" listing, extracts the owner,
//! name, star count and fork count of every listed repository, and appends
//! each one to a local SQLite table.
//!
//! Records are appended without deduplication. A crawl that fails part-way
//! and is started again from the first page will store the already-seen
//! repositories a second time.

pub mod config;
pub mod crawler;
pub mod record;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for crawl operations
///
/// The three per-iteration fault classes carry the URL and the 1-based index
/// of the page being processed when they occurred.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error on page {page} ({url}): {source}")]
    Network {
        url: String,
        page: usize,
        source: crawler::NetworkError,
    },

    #[error("Extraction error on page {page} ({url}): {source}")]
    Extraction {
        url: String,
        page: usize,
        source: crawler::ExtractionError,
    },

    #[error("Persistence error on page {page} ({url}): {source}")]
    Persistence {
        url: String,
        page: usize,
        source: storage::StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Extractor setup error: {0}")]
    ExtractorSetup(#[source] crawler::ExtractionError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlSummary, Crawler};
pub use record::Repository;
pub use state::{CrawlState, Cursor};
pub use storage::{RecordStore, SqliteStorage};
