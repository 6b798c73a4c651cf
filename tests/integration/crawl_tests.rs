//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end: coordinator, worker pool, fetcher and classifier.

use petit_crawl::config::{validate, Config};
use petit_crawl::crawler::{crawl, CrawlOutcome, StopReason};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for a crawl of `base_url`
fn create_test_config(base_url: &str, max_pages: i64) -> Config {
    let mut config = Config::default();
    config.crawl.url = base_url.to_string();
    config.crawl.workers = 4;
    config.crawl.max_pages = max_pages;
    config.crawl.max_time = 20;
    config.crawl.status_interval_ms = 50; // Very short for testing
    config.output.filename = Some("-".to_string());
    config
}

async fn run(config: Config) -> CrawlOutcome {
    let settings = validate(&config).expect("Invalid test configuration");
    tokio::time::timeout(Duration::from_secs(30), crawl(settings))
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed")
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn sitemap_urls(outcome: &CrawlOutcome) -> Vec<String> {
    let mut urls: Vec<String> = outcome.sitemap.iter().map(|p| p.url.clone()).collect();
    urls.sort();
    urls
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><head><link href="/style.css" rel="stylesheet"></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <img src="/logo.png">
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/page1",
        r#"<html><body><img src="/one.png"><a href="/">Home</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/page2",
        r#"<html><body><script src="/two.js"></script></body></html>"#.to_string(),
    )
    .await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    assert_eq!(outcome.reason, StopReason::Stalled);
    assert_eq!(outcome.visited, 3);
    assert_eq!(
        sitemap_urls(&outcome),
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );

    let index = outcome
        .sitemap
        .iter()
        .find(|p| p.url == format!("{}/", base_url))
        .expect("Index page missing");
    assert_eq!(index.assets, vec!["/style.css", "/logo.png"]);
    assert_eq!(
        index.children,
        vec![format!("{}/page1", base_url), format!("{}/page2", base_url)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_page_budget_stops_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">{}</a>"#, i, i))
        .collect();
    mount_html(
        &mock_server,
        "/",
        format!(r#"<html><body><img src="/index.png">{}</body></html>"#, links),
    )
    .await;
    for i in 0..10 {
        mount_html(
            &mock_server,
            &format!("/page{}", i),
            format!(r#"<html><body><img src="/page{}.png"></body></html>"#, i),
        )
        .await;
    }

    let outcome = run(create_test_config(&base_url, 3)).await;

    assert_eq!(outcome.reason, StopReason::PageBudget);
    assert_eq!(outcome.sitemap.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_identical_asset_pages_are_deduplicated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><img src="/home.png">
        <a href="/print/article">Print</a>
        <a href="/article">Article</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    // Same assets in the same order: only one of the two is kept
    let article =
        r#"<html><body><img src="/hero.png"><script src="/app.js"></script></body></html>"#;
    mount_html(&mock_server, "/article", article.to_string()).await;
    mount_html(&mock_server, "/print/article", article.to_string()).await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    assert_eq!(outcome.visited, 3);
    assert_eq!(outcome.sitemap.len(), 2);
    let duplicates = outcome
        .sitemap
        .iter()
        .filter(|p| p.url.ends_with("article"))
        .count();
    assert_eq!(duplicates, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_error_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><img src="/home.png">
        <a href="/missing">Gone</a>
        <a href="/broken">Broken</a>
        <a href="/ok">Fine</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/ok",
        r#"<html><body><img src="/ok.png"></body></html>"#.to_string(),
    )
    .await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    assert_eq!(outcome.reason, StopReason::Stalled);
    assert_eq!(outcome.visited, 4);
    assert_eq!(
        sitemap_urls(&outcome),
        vec![format!("{}/", base_url), format!("{}/ok", base_url)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_url_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index and page link to each other repeatedly
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><img src="/home.png">
            <a href="/page">1</a><a href="/page">2</a><a href="./page">3</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><img src="/page.png">
            <a href="/">Home</a><a href="/page">Self</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    assert_eq!(outcome.visited, 2);
    assert_eq!(outcome.sitemap.len(), 2);

    // Expectations are verified when the server drops
    mock_server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_out_of_domain_links_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><body><img src="/home.png">
            <a href="{}/elsewhere">Other site</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="tel:+15555550100">Call</a>
            </body></html>"#,
            other_server.uri()
        ),
    )
    .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0) // Should never be called
        .mount(&other_server)
        .await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    // tel: has no host, so it counts as in-domain; fetching it fails
    assert_eq!(outcome.visited, 2);
    assert_eq!(outcome.sitemap.len(), 1);
    assert_eq!(outcome.sitemap.pages()[0].children, vec!["tel:+15555550100"]);

    other_server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_home_page_spellings_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body><img src="/home.png">
            <a href="{0}">Home</a><a href="{0}/">Home</a><a href="/">Home</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = run(create_test_config(&base_url, 50)).await;

    assert_eq!(outcome.visited, 1);
    assert_eq!(
        outcome.sitemap.pages()[0].children,
        vec![format!("{}/", base_url); 3]
    );

    mock_server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_time_budget_bounds_crawl_on_slow_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..200)
        .map(|i| format!(r#"<a href="/slow{}">{}</a>"#, i, i))
        .collect();
    mount_html(
        &mock_server,
        "/",
        format!(r#"<html><body><img src="/index.png">{}</body></html>"#, links),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<img src="/late.png">"#)
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 500);
    config.crawl.max_time = 2;
    config.crawl.status_interval_ms = 1000;

    let started = Instant::now();
    let outcome = run(config).await;
    let wall = started.elapsed();

    assert_eq!(outcome.reason, StopReason::TimeBudget);
    assert_eq!(outcome.sitemap.len(), 1);
    // Budget, plus one bounded fetch, plus joining the pool
    assert!(
        outcome.elapsed < Duration::from_secs(2 + 5 + 2),
        "crawl took {:?}",
        outcome.elapsed
    );
    assert!(wall < Duration::from_secs(10), "crawl took {:?}", wall);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_start_stalls_out() {
    let mut config = create_test_config("http://127.0.0.1:1", 50);
    config.crawl.workers = 2;

    let outcome = run(config).await;

    assert_eq!(outcome.reason, StopReason::Stalled);
    assert!(outcome.sitemap.is_empty());
    assert_eq!(outcome.visited, 1);
}
