//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small judge site (listing, solution
//! and plain-text pages) and run both phases end-to-end through the real
//! HTTP page client.

use solution_spider::config::{parse_config, Config, StateBackend};
use solution_spider::output::load_status;
use solution_spider::storage::{open_store, LinkLog, LINK_LOG_FILE, SQLITE_FILE};
use solution_spider::{harvest, HarvestOptions, SpiderError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/PRACTICE/status/PROB";

/// Creates a test configuration pointing at the mock server with no delays
fn create_test_config(site_url: &str, state_dir: &Path, solutions_dir: &Path) -> Config {
    let mut config = parse_config(
        r#"
[target]
problem-id = "PROB"
category = "PRACTICE"
"#,
    )
    .expect("Failed to parse test config");

    config.target.site_url = site_url.to_string();
    config.crawler.page_delay = 0;
    config.crawler.page_jitter = 0;
    config.crawler.item_delay = 0;
    config.crawler.item_jitter = 0;
    config.crawler.navigation_timeout = 5_000;
    config.state.directory = state_dir.to_path_buf();
    config.output.solutions_directory = solutions_dir.to_path_buf();
    config
}

fn listing_page(ids: &[&str], has_next: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| format!("<tr><td>{}</td><td>someone</td><td>0.01</td></tr>", id))
        .collect();
    let disabled = if has_next { "" } else { " disabled" };
    format!(
        r#"<html><body>
        <table class="MuiTable-root">
            <thead><tr><th>ID</th><th>User</th><th>Time</th></tr></thead>
            <tbody class="MuiTableBody-root">{}</tbody>
        </table>
        <button aria-label="Next Page"{}>next</button>
        </body></html>"#,
        rows, disabled
    )
}

fn solution_page(status: &str, language: &str) -> String {
    format!(
        r#"<html><body>
        <div class="_status_container_x1y2"><span>{}</span></div>
        <div class="_ideLanguageName_q7"> {} </div>
        </body></html>"#,
        status, language
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("language", "C"))
        .and(query_param("limit", "100"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_submission(server: &MockServer, id: &str, status: &str, language: &str, code: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/viewsolution/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(solution_page(status, language), "text/html"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/viewplaintext/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(code))
        .mount(server)
        .await;
}

/// Two listing pages, three submissions
async fn mount_site(server: &MockServer) {
    mount_listing(server, 1, listing_page(&["101", "102"], true)).await;
    mount_listing(server, 2, listing_page(&["103"], false)).await;

    mount_submission(
        server,
        "101",
        "Correct Answer",
        "C++17",
        "#include <cstdio>\nint main() { return 0; }\n",
    )
    .await;
    mount_submission(server, "102", "Wrong Answer", "PYTH 3", "print(1 < 2)\n").await;
    mount_submission(server, "103", "Correct Answer", "C", "int main(void) { return 0; }\n")
        .await;
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_harvest_writes_classified_sources() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let state_dir = TempDir::new().unwrap();
    let solutions_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), state_dir.path(), solutions_dir.path());

    let report = harvest(&config, HarvestOptions::default())
        .await
        .expect("Harvest should succeed");

    let discovery = report.discovery.expect("Discovery should have run");
    assert_eq!(discovery.pages_fetched, 2);
    assert_eq!(discovery.links.len(), 3);
    assert_eq!(report.processing.processed, 3);

    let problem_dir = solutions_dir.path().join("PROB");
    assert_eq!(
        fs::read_to_string(problem_dir.join("correctanswer").join("101.cpp")).unwrap(),
        "#include <cstdio>\nint main() { return 0; }\n"
    );
    assert_eq!(
        fs::read_to_string(problem_dir.join("wronganswer").join("102.py")).unwrap(),
        "print(1 < 2)\n"
    );
    assert!(problem_dir.join("correctanswer").join("103.c").exists());

    let log = fs::read_to_string(state_dir.path().join(LINK_LOG_FILE)).unwrap();
    let expected: Vec<String> = ["101", "102", "103"]
        .iter()
        .map(|id| format!("{}/viewsolution/{}", mock_server.uri(), id))
        .collect();
    assert_eq!(log.lines().collect::<Vec<_>>(), expected);

    let page_state: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(state_dir.path().join("page-state.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(page_state["lastPage"], 2);

    let ledger: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(state_dir.path().join("processed-state.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(ledger["currentIndex"], 3);
    assert_eq!(ledger["processed"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_failed_item_resumes_at_failure_point() {
    let mock_server = MockServer::start().await;

    // Submission 102 is down for the first run
    mount_listing(&mock_server, 1, listing_page(&["101", "102", "103"], false)).await;
    mount_submission(&mock_server, "101", "Correct Answer", "C", "one\n").await;
    Mock::given(method("GET"))
        .and(path("/viewsolution/102"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_submission(&mock_server, "103", "Correct Answer", "C", "three\n").await;

    let state_dir = TempDir::new().unwrap();
    let solutions_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), state_dir.path(), solutions_dir.path());

    let err = harvest(&config, HarvestOptions::default())
        .await
        .expect_err("Harvest should stop at the broken submission");
    match err {
        SpiderError::ItemFailed { link, position, .. } => {
            assert!(link.ends_with("/viewsolution/102"));
            assert_eq!(position, 1);
        }
        other => panic!("Unexpected error: {}", other),
    }

    let correct = solutions_dir.path().join("PROB").join("correctanswer");
    assert!(correct.join("101.c").exists());
    assert!(!correct.join("103.c").exists());

    // Site recovers; resume must not rediscover or refetch 101
    mock_server.reset().await;
    mount_site(&mock_server).await;

    let options = HarvestOptions {
        resume: true,
        ..Default::default()
    };
    let report = harvest(&config, options)
        .await
        .expect("Resumed harvest should succeed");

    assert!(report.discovery.is_none());
    assert_eq!(report.processing.processed, 2);

    let paths = requested_paths(&mock_server).await;
    assert!(!paths.iter().any(|p| p == LISTING_PATH));
    assert!(!paths.iter().any(|p| p == "/viewsolution/101"));
    assert!(paths.iter().any(|p| p == "/viewsolution/102"));

    assert_eq!(fs::read_to_string(correct.join("101.c")).unwrap(), "one\n");
    assert!(solutions_dir
        .path()
        .join("PROB")
        .join("wronganswer")
        .join("102.py")
        .exists());
    assert!(correct.join("103.c").exists());
}

#[tokio::test]
async fn test_listing_failure_keeps_recorded_pages() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, listing_page(&["101"], true)).await;
    // Page 2 renders without the listing table
    mount_listing(
        &mock_server,
        2,
        "<html><body><p>Rate limited</p></body></html>".to_string(),
    )
    .await;

    let state_dir = TempDir::new().unwrap();
    let solutions_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), state_dir.path(), solutions_dir.path());

    let err = harvest(&config, HarvestOptions::default())
        .await
        .expect_err("Harvest should stop at page 2");
    assert!(matches!(err, SpiderError::PageFailed { page: 2, .. }));

    let store = open_store(&config.state).unwrap();
    let log = LinkLog::in_dir(&config.state.directory);
    let status = load_status(store.as_ref(), &log, &config.target.listing_url().unwrap()).unwrap();
    assert_eq!(status.last_page, Some(1));
    assert_eq!(status.next_page, 2);
    assert_eq!(status.logged_links, 1);
    assert_eq!(status.processed, 0);
}

#[tokio::test]
async fn test_sqlite_backend_full_harvest() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let state_dir = TempDir::new().unwrap();
    let solutions_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), state_dir.path(), solutions_dir.path());
    config.state.backend = StateBackend::Sqlite;

    let report = harvest(&config, HarvestOptions::default())
        .await
        .expect("Harvest should succeed");
    assert_eq!(report.processing.processed, 3);
    assert!(state_dir.path().join(SQLITE_FILE).exists());
    assert!(!state_dir.path().join("page-state.json").exists());

    let store = open_store(&config.state).unwrap();
    let log = LinkLog::in_dir(&config.state.directory);
    let status = load_status(store.as_ref(), &log, &config.target.listing_url().unwrap()).unwrap();
    assert_eq!(status.last_page, Some(2));
    assert_eq!(status.current_index, 3);
    assert_eq!(status.remaining, 0);
}
