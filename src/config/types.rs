use crate::url::DomainRef;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Hard ceiling on the number of workers a crawl may spawn
pub const MAX_WORKERS: usize = 1000;

/// Main configuration structure for Petit-Crawl
///
/// This is the raw form read from a TOML file and command-line overrides.
/// Budgets are signed so that negative values can be reported instead of
/// failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlConfig {
    /// Starting URL; its scheme and host scope the crawl
    pub url: String,

    /// Number of worker tasks to spawn
    pub workers: i64,

    /// Maximum number of pages to collect
    pub max_pages: i64,

    /// Maximum time to crawl for (seconds)
    pub max_time: i64,

    /// Per-request HTTP timeout (seconds)
    pub request_timeout: u64,

    /// Interval between stall checks (milliseconds)
    pub status_interval_ms: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            workers: 100,
            max_pages: 500,
            max_time: 180,
            request_timeout: 5,
            status_interval_ms: 1000,
            user_agent: format!("petit-crawl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Number of assets and children printed per page
    pub print_limit: i64,

    /// File the sitemap is written to; `-` for stdout, unset for `<host>.txt`
    pub filename: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            print_limit: 10,
            filename: None,
        }
    }
}

/// Where the sitemap report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Validated settings for one crawl run
///
/// Built once by [`crate::config::validate`] and handed to the coordinator
/// by value; nothing in it changes while the crawl runs.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// The normalized domain reference (leading `www.` removed)
    pub domain: DomainRef,
    pub workers: usize,
    pub page_budget: usize,
    pub time_budget: Duration,
    pub print_limit: usize,
    pub output: OutputTarget,
    pub request_timeout: Duration,
    pub status_interval: Duration,
    pub user_agent: String,
}

impl CrawlSettings {
    /// The URL the crawl is seeded with
    pub fn start_url(&self) -> String {
        self.domain.to_string()
    }
}
