use serde::Deserialize;

/// Storage location selecting a non-persistent, in-memory database
pub const MEMORY_DATABASE: &str = ":memory:";

const DEFAULT_START_URL: &str =
    "https://github.com/optuna/optuna/network/dependents?package_id=UGFja2FnZS0xOTY2MjQ5Njg%3D";

/// Main configuration structure for Dependents-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page to fetch
    #[serde(rename = "start-url", default = "default_start_url")]
    pub start_url: String,

    /// Upper bound of the randomized wait between pages (seconds)
    #[serde(rename = "interval-seconds", default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            interval_seconds: default_interval_seconds(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file, or `:memory:`
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Config {
    /// Replaces the initial crawl inputs with any values given on the command line
    pub fn with_overrides(
        mut self,
        start_url: Option<String>,
        interval_seconds: Option<u64>,
        database_path: Option<String>,
    ) -> Self {
        if let Some(url) = start_url {
            self.crawler.start_url = url;
        }
        if let Some(interval) = interval_seconds {
            self.crawler.interval_seconds = interval;
        }
        if let Some(path) = database_path {
            self.output.database_path = path;
        }
        self
    }

    /// Returns true if records will not outlive the process
    pub fn is_ephemeral(&self) -> bool {
        self.output.database_path == MEMORY_DATABASE
    }
}

fn default_start_url() -> String {
    DEFAULT_START_URL.to_string()
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_crawler_name() -> String {
    "dependents-crawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/optuna/optuna".to_string()
}

fn default_database_path() -> String {
    "sample.db".to_string()
}
