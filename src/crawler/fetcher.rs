//! HTTP fetcher implementation
//!
//! This module handles the one HTTP request made per listing page:
//! - Building the HTTP client with the configured user agent
//! - GET requests returning the page body as text
//! - Classifying failures as network errors
//!
//! There is no retry: a failed fetch ends the crawl.

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure to retrieve a listing page
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection, timeout, TLS or body decoding failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use dependents_crawler::config::UserAgentConfig;
/// use dependents_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a listing page and returns its body
///
/// Redirects are followed by the client. Any status outside 2xx after that is
/// reported as [`NetworkError::Status`].
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, NetworkError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        tracing::warn!("GET {} returned {}", url, status);
        return Err(NetworkError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    tracing::trace!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}
