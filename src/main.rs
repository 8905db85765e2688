//! Dependents-Crawler main entry point
//!
//! This is the command-line interface for the dependents crawler.

use anyhow::Context;
use clap::Parser;
use dependents_crawler::config::{load_config_with_hash, validate, Config};
use dependents_crawler::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dependents-Crawler: collects the dependent repositories of a package
///
/// Walks a paginated dependents listing from the start URL, storing the
/// owner, name, stars and forks of every listed repository in SQLite.
/// Records are appended; rerunning a crawl stores them again.
#[derive(Parser, Debug)]
#[command(name = "dependents-crawler")]
#[command(version)]
#[command(about = "Collects the dependent repositories of a package", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// First dependents page to fetch
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Maximum wait between two page fetches, in seconds
    #[arg(short, long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// SQLite database path, or :memory: for a throwaway run
    #[arg(short, long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let config = config.with_overrides(cli.url, cli.interval, cli.database);
    validate(&config).context("invalid crawl settings")?;

    tracing::info!(
        "Crawling {} (interval {}s) into {}",
        config.crawler.start_url,
        config.crawler.interval_seconds,
        config.output.database_path
    );
    if config.is_ephemeral() {
        tracing::warn!("Using an in-memory database; records are discarded on exit");
    }

    match crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl {}: {} records from {} pages",
                summary.final_state,
                summary.records_stored,
                summary.pages_crawled
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dependents_crawler=info,warn"),
            1 => EnvFilter::new("dependents_crawler=debug,info"),
            2 => EnvFilter::new("dependents_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
