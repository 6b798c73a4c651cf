//! Petit-Crawl: a bounded single-domain web crawler
//!
//! This crate walks one domain starting from a seed URL, records the static
//! assets and in-domain links of every page it fetches, and stops once a page
//! budget, a time budget, or stalled discovery ends the run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Errors raised while crawling a single URL, plus HTTP client setup failures
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Fetch failed for {url}: {source}")]
    FetchFailed { url: String, source: reqwest::Error },

    #[error("No response from {url} within {timeout:?}")]
    FetchTimeout { url: String, timeout: Duration },

    #[error("Bad response status {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    ParseFailed { url: String, message: String },

    #[error("Link extraction exceeded {0:?}")]
    WalkTimeout(Duration),

    #[error("Timed out publishing discovered URL {url}")]
    PublishTimeout { url: String },

    #[error("No page to populate")]
    NilPage,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Worker count must be between 1 and {max}, got {count}")]
    InvalidWorkerCount { count: i64, max: usize },

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("No output target to write the sitemap to")]
    MissingOutputTarget,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings, OutputTarget};
pub use crawler::{crawl, Coordinator, CrawlOutcome, StopReason};
pub use state::{Page, Sitemap};
pub use url::{check_domain, DomainRef};
