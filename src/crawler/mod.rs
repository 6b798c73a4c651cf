//! Crawler module for web page fetching and processing
//!
//! This module contains the concurrent crawl engine:
//! - HTTP fetching with a single retry
//! - HTML tree walk that classifies assets and child links
//! - Worker tasks and the pool that shuts them down
//! - The coordinator that owns all crawl state

mod classifier;
mod coordinator;
mod fetcher;
mod worker;

pub use classifier::{parse_page, LinkClassifier, PUBLISH_TIMEOUT, WALK_TIMEOUT};
pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, StopReason};
pub use fetcher::{build_http_client, fetch_page};
pub use worker::{Worker, WorkerChannels, WorkerPool, DELIVERY_TIMEOUT, FETCH_DEADLINE};

use crate::config::CrawlSettings;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Check the domain reference
/// 2. Build the HTTP client and spawn the worker pool
/// 3. Fetch pages and follow in-domain links until a budget or a stall
///    ends the run
/// 4. Shut the pool down and return the collected sitemap
///
/// # Arguments
///
/// * `settings` - The validated crawl settings
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished; the outcome holds the sitemap
/// * `Err(CrawlError)` - The crawl could not be started
pub async fn crawl(settings: CrawlSettings) -> Result<CrawlOutcome> {
    run_crawl(settings).await
}
