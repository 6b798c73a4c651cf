//! URL handling module for Petit-Crawl
//!
//! This module owns the domain reference that scopes a crawl and the check
//! every component runs before trusting it.

mod domain;

pub use domain::{authority, check_domain, DomainRef};
