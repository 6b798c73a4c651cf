//! Crawl result types
//!
//! This module contains the page record produced by workers and the bounded
//! sitemap the coordinator collects them into.

mod page;
mod sitemap;

pub use page::Page;
pub use sitemap::Sitemap;
