//! Configuration module for Petit-Crawl
//!
//! This module handles loading crawl settings from TOML, and validating the
//! merged file/command-line configuration into [`CrawlSettings`].
//!
//! # Example
//!
//! ```
//! use petit_crawl::config::{validate, Config};
//!
//! let mut config = Config::default();
//! config.crawl.url = "http://example.com".to_string();
//! let settings = validate(&config).unwrap();
//! println!("Crawler will collect at most {} pages", settings.page_budget);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, CrawlSettings, OutputConfig, OutputTarget, MAX_WORKERS};

// Re-export parser functions
pub use parser::{load_config, load_settings, parse_config};
pub use validation::validate;
