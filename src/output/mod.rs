//! Output module for writing crawl results
//!
//! This module turns a finished crawl into the human-readable sitemap report,
//! written to a file or to stdout.

mod report;

pub use report::{write_page, write_report, write_report_to_target};
