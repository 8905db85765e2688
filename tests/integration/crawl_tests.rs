//! Integration tests for the crawl loop
//!
//! These tests use wiremock to serve dependents pages and run the full
//! fetch, extract, store cycle end-to-end.

use dependents_crawler::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use dependents_crawler::crawler::{build_http_client, crawl, ExtractionError, NetworkError};
use dependents_crawler::storage::{RecordStore, SqliteStorage, StorageError, StorageResult};
use dependents_crawler::{CrawlError, CrawlState, Crawler, Repository};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn row(authority_type: &str, authority: &str, name: &str, stars: &str, forks: &str) -> String {
    format!(
        r#"<div class="Box-row d-flex flex-items-center" data-test-id="dg-repo-pkg-dependent">
             <span class="f5 color-fg-muted">
               <a data-hovercard-type="{authority_type}" href="/{authority}">{authority}</a> /
               <a class="text-bold" data-hovercard-type="repository" href="/{authority}/{name}">{name}</a>
             </span>
             <div class="d-flex flex-auto flex-justify-end">
               <span class="color-fg-muted text-bold pl-3"><svg></svg> {stars}</span>
               <span class="color-fg-muted text-bold pl-3"><svg></svg> {forks}</span>
             </div>
           </div>"#
    )
}

fn page(rows: &[String], next_href: Option<&str>) -> String {
    let next = match next_href {
        Some(href) => format!(r#"<a class="btn btn-outline BtnGroup-item" href="{href}">Next</a>"#),
        None => r#"<button class="btn btn-outline BtnGroup-item" disabled="disabled">Next</button>"#
            .to_string(),
    };
    format!(
        r#"<html><body><div class="Box">{}</div>
           <div class="paginate-container"><div class="BtnGroup">
             <button class="btn btn-outline BtnGroup-item" disabled="disabled">Previous</button>
             {}
           </div></div></body></html>"#,
        rows.join("\n"),
        next
    )
}

async fn serve(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn crawler_config(start_url: String) -> CrawlerConfig {
    CrawlerConfig {
        start_url,
        interval_seconds: 0,
    }
}

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    }
}

/// Store that records what it was given and whether it was closed
#[derive(Clone, Default)]
struct RecordingStore {
    records: Rc<RefCell<Vec<Repository>>>,
    closed: Rc<RefCell<bool>>,
}

impl RecordStore for RecordingStore {
    fn store(&mut self, record: &Repository) -> StorageResult<()> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }

    fn close(self) -> StorageResult<()> {
        *self.closed.borrow_mut() = true;
        Ok(())
    }
}

/// Store whose writes fail after a fixed number of successes
struct FailingStore {
    remaining: usize,
}

impl RecordStore for FailingStore {
    fn store(&mut self, _record: &Repository) -> StorageResult<()> {
        if self.remaining == 0 {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.remaining -= 1;
        Ok(())
    }

    fn close(self) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_two_pages_end_to_end() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    serve(
        &server,
        "/dependents",
        page(
            &[
                row("organization", "acme", "rocket", "1,234", "56"),
                row("user", "alice", "notes", "0", "0"),
            ],
            Some(&format!("{}/dependents-after-2", base_url)),
        ),
    )
    .await;
    serve(
        &server,
        "/dependents-after-2",
        page(&[row("user", "bob", "bench", "7", "1")], None),
    )
    .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("dependents.db");
    let config = Config {
        crawler: crawler_config(format!("{}/dependents", base_url)),
        user_agent: test_user_agent(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    };

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.records_stored, 3);
    assert_eq!(summary.final_state, CrawlState::Done);

    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(
        storage.list_records().expect("Failed to list records"),
        vec![
            Repository::new("acme", "rocket", 1234, 56),
            Repository::new("alice", "notes", 0, 0),
            Repository::new("bob", "bench", 7, 1),
        ]
    );
}

#[tokio::test]
async fn test_relative_next_link_is_followed() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/owner/pkg/network/dependents",
        page(
            &[row("organization", "acme", "rocket", "3", "1")],
            Some("/owner/pkg/network/dependents-2"),
        ),
    )
    .await;
    serve(
        &server,
        "/owner/pkg/network/dependents-2",
        page(&[row("user", "bob", "bench", "2", "0")], None),
    )
    .await;

    let store = RecordingStore::default();
    let client = build_http_client(&test_user_agent()).unwrap();
    let crawler = Crawler::new(
        &crawler_config(format!("{}/owner/pkg/network/dependents", server.uri())),
        client,
        store.clone(),
    )
    .unwrap();

    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(store.records.borrow().len(), 2);
    assert!(*store.closed.borrow());
}

#[tokio::test]
async fn test_single_page_without_next_is_done() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/dependents",
        page(&[row("user", "carol", "solo", "12", "3")], None),
    )
    .await;

    let store = RecordingStore::default();
    let client = build_http_client(&test_user_agent()).unwrap();
    let crawler = Crawler::new(
        &crawler_config(format!("{}/dependents", server.uri())),
        client,
        store.clone(),
    )
    .unwrap();

    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.final_state, CrawlState::Done);
    assert_eq!(
        *store.records.borrow(),
        vec![Repository::new("carol", "solo", 12, 3)]
    );
    assert!(*store.closed.borrow());
}

#[tokio::test]
async fn test_malformed_row_halts_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let orphan = r#"<div class="Box-row"><span class="f5 color-fg-muted">
          <a data-hovercard-type="repository" href="/x/orphan">orphan</a></span>
        <span class="color-fg-muted text-bold pl-3">1</span>
        <span class="color-fg-muted text-bold pl-3">1</span></div>"#
        .to_string();

    serve(
        &server,
        "/dependents",
        page(
            &[
                row("organization", "acme", "rocket", "5", "5"),
                orphan,
                row("user", "never", "stored", "9", "9"),
            ],
            Some(&format!("{}/dependents-after-2", base_url)),
        ),
    )
    .await;

    // The second page must never be requested
    Mock::given(method("GET"))
        .and(path("/dependents-after-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = RecordingStore::default();
    let client = build_http_client(&test_user_agent()).unwrap();
    let crawler = Crawler::new(
        &crawler_config(format!("{}/dependents", base_url)),
        client,
        store.clone(),
    )
    .unwrap();

    let err = crawler.run().await.unwrap_err();

    match err {
        CrawlError::Extraction { page, url, source } => {
            assert_eq!(page, 1);
            assert_eq!(url, format!("{}/dependents", base_url));
            assert!(matches!(source, ExtractionError::MissingAuthority { row: 2 }));
        }
        other => panic!("expected extraction error, got {:?}", other),
    }

    assert_eq!(
        *store.records.borrow(),
        vec![Repository::new("acme", "rocket", 5, 5)]
    );
    assert!(!*store.closed.borrow());
}

#[tokio::test]
async fn test_network_error_reports_page_index() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    serve(
        &server,
        "/dependents",
        page(
            &[row("user", "alice", "notes", "1", "1")],
            Some(&format!("{}/dependents-after-2", base_url)),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dependents-after-2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingStore::default();
    let client = build_http_client(&test_user_agent()).unwrap();
    let crawler = Crawler::new(
        &crawler_config(format!("{}/dependents", base_url)),
        client,
        store.clone(),
    )
    .unwrap();

    let err = crawler.run().await.unwrap_err();

    match err {
        CrawlError::Network { page, url, source } => {
            assert_eq!(page, 2);
            assert_eq!(url, format!("{}/dependents-after-2", base_url));
            assert!(matches!(source, NetworkError::Status(500)));
        }
        other => panic!("expected network error, got {:?}", other),
    }

    // Records from the first page were already stored
    assert_eq!(store.records.borrow().len(), 1);
}

#[tokio::test]
async fn test_persistence_error_halts_crawl() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/dependents",
        page(
            &[
                row("organization", "acme", "rocket", "5", "5"),
                row("user", "bob", "bench", "2", "0"),
            ],
            None,
        ),
    )
    .await;

    let client = build_http_client(&test_user_agent()).unwrap();
    let crawler = Crawler::new(
        &crawler_config(format!("{}/dependents", server.uri())),
        client,
        FailingStore { remaining: 1 },
    )
    .unwrap();

    let err = crawler.run().await.unwrap_err();

    assert!(matches!(err, CrawlError::Persistence { page: 1, .. }));
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn test_rerun_duplicates_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dependents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            &[row("organization", "acme", "rocket", "1", "0")],
            None,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("dependents.db");
    let config = Config {
        crawler: crawler_config(format!("{}/dependents", server.uri())),
        user_agent: test_user_agent(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    };

    crawl(config.clone()).await.expect("First crawl failed");
    crawl(config).await.expect("Second crawl failed");

    let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    assert_eq!(storage.count_records().unwrap(), 2);
}

#[tokio::test]
async fn test_memory_database_run() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/dependents",
        page(&[row("user", "dana", "scratch", "4", "4")], None),
    )
    .await;

    let config = Config {
        crawler: crawler_config(format!("{}/dependents", server.uri())),
        user_agent: test_user_agent(),
        output: OutputConfig {
            database_path: ":memory:".to_string(),
        },
    };

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.records_stored, 1);
    assert_eq!(summary.final_state, CrawlState::Done);
}
