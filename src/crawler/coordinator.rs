//! Crawl loop - fetch, extract, store, wait, advance
//!
//! The loop is strictly sequential. Each iteration:
//! - Fetches the page under the cursor
//! - Stores every record on it, in document order, as soon as it is extracted
//! - Resolves the "Next" reference into the following cursor
//! - Sleeps for a random time between zero and the configured interval
//!
//! Any fault ends the crawl immediately. Progress is not checkpointed, so a
//! rerun starts from the first page and stores its records again.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::{ExtractionError, Extractor};
use crate::crawler::fetcher::fetch_page;
use crate::record::Repository;
use crate::state::{CrawlState, Cursor};
use crate::storage::RecordStore;
use crate::{ConfigError, CrawlError};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Outcome of a crawl that reached the end of pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_crawled: usize,
    pub records_stored: usize,
    pub final_state: CrawlState,
}

/// Drives the fetch, extract and store cycle over a paginated listing
pub struct Crawler<S: RecordStore> {
    client: Client,
    extractor: Extractor,
    store: S,
    start_url: Url,
    interval: Duration,
}

impl<S: RecordStore> Crawler<S> {
    /// Creates a crawler from its settings and collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Start URL and maximum wait between pages
    /// * `client` - HTTP client used for every page fetch
    /// * `store` - Destination for extracted records; closed when the crawl ends
    pub fn new(config: &CrawlerConfig, client: Client, store: S) -> Result<Self, CrawlError> {
        let start_url = Url::parse(&config.start_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", config.start_url, e))
        })?;

        Ok(Self {
            client,
            extractor: Extractor::new().map_err(CrawlError::ExtractorSetup)?,
            store,
            start_url,
            interval: Duration::from_secs(config.interval_seconds),
        })
    }

    /// Runs the crawl until pagination is exhausted
    ///
    /// The store is closed on success. On error the crawler, store included,
    /// is dropped without an explicit close.
    pub async fn run(mut self) -> Result<CrawlSummary, CrawlError> {
        let mut cursor = Cursor::start(self.start_url.clone());
        let mut pages_crawled = 0;
        let mut records_stored = 0;

        while let Some(url) = cursor.url().cloned() {
            pages_crawled += 1;
            tracing::info!("GET {}", url);

            let body = fetch_page(&self.client, url.as_str())
                .await
                .map_err(|source| CrawlError::Network {
                    url: url.to_string(),
                    page: pages_crawled,
                    source,
                })?;

            let (stored, next_href) = self.store_page(&url, pages_crawled, &body)?;
            records_stored += stored;
            tracing::debug!("Stored {} records from page {}", stored, pages_crawled);

            let next = Cursor::following(&url, next_href.as_deref()).map_err(|source| {
                CrawlError::Extraction {
                    url: url.to_string(),
                    page: pages_crawled,
                    source: ExtractionError::InvalidNextPage {
                        href: next_href.clone().unwrap_or_default(),
                        source,
                    },
                }
            })?;

            self.wait().await;

            match &next {
                Cursor::Active(next_url) => tracing::info!("Next: {}", next_url),
                Cursor::Exhausted => tracing::info!("Reached end of pagination"),
            }
            cursor = next;
        }

        self.store.close()?;

        Ok(CrawlSummary {
            pages_crawled,
            records_stored,
            final_state: cursor.state(),
        })
    }

    /// Extracts and stores every record of one page
    ///
    /// Returns the number of records stored and the raw "Next" reference.
    fn store_page(
        &mut self,
        url: &Url,
        page: usize,
        body: &str,
    ) -> Result<(usize, Option<String>), CrawlError> {
        let listing = self.extractor.extract(body);
        let mut stored = 0;

        for record in listing.records() {
            let record: Repository = record.map_err(|source| CrawlError::Extraction {
                url: url.to_string(),
                page,
                source,
            })?;

            self.store
                .store(&record)
                .map_err(|source| CrawlError::Persistence {
                    url: url.to_string(),
                    page,
                    source,
                })?;
            stored += 1;
        }

        Ok((stored, listing.next_page()))
    }

    async fn wait(&self) {
        let delay = random_delay(self.interval);
        tracing::debug!("Wait {:.3}s", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// Draws a delay uniformly from `[0, max]`
pub fn random_delay(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(rand::random_range(0.0..=max.as_secs_f64()))
}
