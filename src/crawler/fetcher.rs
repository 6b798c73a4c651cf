//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - GET requests with a single retry on transport failure, both attempts
//!   sharing one deadline
//! - Status validation (anything but 200 is skipped)
//! - Handing the body to the link classifier

use crate::config::CrawlSettings;
use crate::crawler::classifier::parse_page;
use crate::state::Page;
use crate::url::{check_domain, DomainRef};
use crate::{CrawlError, Result};
use flume::Sender;
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - The crawl settings (user agent and request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlError::Client)` - Failed to build client
pub fn build_http_client(settings: &CrawlSettings) -> Result<Client> {
    let client = Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.request_timeout)
        .connect_timeout(settings.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()?;
    Ok(client)
}

/// Fetches a URL and extracts its assets and child links
///
/// # Request Flow
///
/// 1. Validate the URL and the crawl domain
/// 2. Send a GET request, retrying once if no response arrives
/// 3. Reject any status other than 200
/// 4. Parse the body and classify references on the blocking pool
///
/// Steps 2 and 3, including the retry and the body read, share one
/// `deadline`. Child links are published on `discovered` while the body is
/// walked.
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | URL does not parse as http(s) | `InvalidUrl` |
/// | Domain has no scheme or host | `InvalidDomain` |
/// | Both attempts fail without a response | `FetchFailed` |
/// | No body within `deadline` | `FetchTimeout` |
/// | Status is not 200 | `BadStatus` |
/// | Body cannot be read or parsed | `ParseFailed` |
/// | Walk or publish deadline expired | `WalkTimeout` / `PublishTimeout` |
pub async fn fetch_page(
    client: &Client,
    url: &str,
    domain: &mut DomainRef,
    discovered: &Sender<String>,
    deadline: Duration,
) -> Result<Page> {
    let started = Instant::now();

    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        _ => {
            return Err(CrawlError::InvalidUrl {
                url: url.to_string(),
            })
        }
    }
    check_domain(domain)?;

    tracing::debug!("Requesting {}", url);
    let body = tokio::time::timeout(deadline, download(client, url))
        .await
        .map_err(|_| {
            tracing::warn!("No body from {} within {:?}; skipping", url, deadline);
            CrawlError::FetchTimeout {
                url: url.to_string(),
                timeout: deadline,
            }
        })??;

    let page_url = url.to_string();
    let domain = domain.clone();
    let discovered = discovered.clone();
    let page = tokio::task::spawn_blocking(move || {
        parse_page(&body, &page_url, &domain, &discovered, started)
    })
    .await
    .map_err(|e| CrawlError::ParseFailed {
        url: url.to_string(),
        message: e.to_string(),
    })??;

    tracing::debug!(
        "Done with {}: {} assets, {} children",
        url,
        page.assets.len(),
        page.children.len()
    );
    Ok(page)
}

/// Requests a page and reads its body if the status is 200
async fn download(client: &Client, url: &str) -> Result<String> {
    let response = send_with_retry(client, url).await?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::warn!("Bad response from {}: HTTP {}; skipping", url, status.as_u16());
        return Err(CrawlError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| CrawlError::ParseFailed {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Sends a GET request, trying a second time if the first gets no response
///
/// Only transport failures are retried; an HTTP error status is a response
/// and is returned as is.
async fn send_with_retry(client: &Client, url: &str) -> Result<Response> {
    match client.get(url).send().await {
        Ok(response) => Ok(response),
        Err(first) => {
            tracing::debug!("No response from {} ({}); retrying once", url, first);
            client.get(url).send().await.map_err(|source| {
                tracing::warn!("No response from {}: {}; skipping", url, source);
                CrawlError::FetchFailed {
                    url: url.to_string(),
                    source,
                }
            })
        }
    }
}
