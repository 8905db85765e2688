//! Crawler module for dependents listing pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of listing pages
//! - Extraction of repository records and the pagination link
//! - The sequential crawl loop with its randomized politeness delay

mod coordinator;
mod extractor;
mod fetcher;

pub use coordinator::{random_delay, CrawlSummary, Crawler};
pub use extractor::{parse_count, ExtractionError, Extractor, ListingPage, Records};
pub use fetcher::{build_http_client, fetch_page, NetworkError};

use crate::config::Config;
use crate::storage::open_storage;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open (or create) the record store
/// 2. Build the HTTP client
/// 3. Walk the listing from the start URL until no "Next" page remains
/// 4. Close the record store
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Pagination was exhausted
/// * `Err(CrawlError)` - The crawl stopped on the first fault
pub async fn crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    let store = open_storage(&config.output.database_path)?;
    let client = build_http_client(&config.user_agent)?;

    Crawler::new(&config.crawler, client, store)?.run().await
}
