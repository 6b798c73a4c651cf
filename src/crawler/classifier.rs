//! HTML tree walk that sorts references into assets and child links
//!
//! The walk visits every node of a parsed document once, in document order,
//! and only looks at `a`, `img`, `link` and `script` elements:
//! - `src` attributes are always assets
//! - `href` attributes are assets (javascript: scheme, image and stylesheet
//!   extensions), in-domain child links, or ignored
//!
//! Every child link is also published to the coordinator while the walk is
//! running. Both the walk and each publish are bounded in time so a worker
//! is never stuck on one page.

use crate::state::Page;
use crate::url::{authority, DomainRef};
use crate::{CrawlError, Result};
use flume::Sender;
use scraper::node::Element;
use scraper::Html;
use std::time::{Duration, Instant};
use url::Url;

/// Ceiling on the time spent extracting references from one page
pub const WALK_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on handing one discovered URL to the coordinator
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(2);

/// Elements whose attributes are inspected
const INSPECTED_ELEMENTS: &[&str] = &["a", "img", "link", "script"];

/// Substrings that mark an href as a static asset
const ASSET_MARKERS: &[&str] = &[".png", ".jpg", ".ico", ".css"];

/// What an `href` value turned out to be
#[derive(Debug, PartialEq, Eq)]
enum Href {
    /// Record the literal value as an asset
    Asset,
    /// Follow this absolute URL
    Child(String),
    /// Out of domain or mailto
    Ignored,
    /// Could not be parsed; inspection moves on to the next attribute
    Unparseable,
}

/// Walks parsed documents for one crawl domain
pub struct LinkClassifier<'a> {
    domain: &'a DomainRef,
    discovered: &'a Sender<String>,
    started: Instant,
}

impl<'a> LinkClassifier<'a> {
    /// Creates a classifier whose time budget counts from `started`
    pub fn new(domain: &'a DomainRef, discovered: &'a Sender<String>, started: Instant) -> Self {
        Self {
            domain,
            discovered,
            started,
        }
    }

    /// Fills `page.assets` and `page.children` from `document`
    ///
    /// A missing document yields an empty result. The walk stops at the
    /// first error; whatever was collected up to that point stays in `page`.
    ///
    /// # Errors
    ///
    /// * `NilPage` - no page to fill
    /// * `InvalidDomain` - the crawl domain has no scheme or host
    /// * `WalkTimeout` - the walk ran past [`WALK_TIMEOUT`]
    /// * `PublishTimeout` - a child link could not be handed over within
    ///   [`PUBLISH_TIMEOUT`]
    pub fn classify(
        &self,
        document: Option<&Html>,
        page: Option<&mut Page>,
    ) -> Result<()> {
        let page = page.ok_or(CrawlError::NilPage)?;
        self.domain.validate()?;

        let Some(document) = document else {
            return Ok(());
        };
        let base = self.domain.base_url()?;

        // Explicit stack instead of recursion: deeply nested markup must not
        // overflow the thread stack. Children are pushed in reverse to keep
        // pre-order.
        let mut stack = vec![document.tree.root()];
        while let Some(node) = stack.pop() {
            if self.started.elapsed() >= WALK_TIMEOUT {
                return Err(CrawlError::WalkTimeout(WALK_TIMEOUT));
            }

            if let Some(element) = node.value().as_element() {
                if INSPECTED_ELEMENTS.contains(&element.name()) {
                    self.inspect(element, &base, page)?;
                }
            }

            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }

    /// Records the first `src` or classifiable `href` of an element
    fn inspect(&self, element: &Element, base: &Url, page: &mut Page) -> Result<()> {
        for (name, value) in element.attrs() {
            match name {
                "src" => {
                    page.assets.push(value.to_string());
                    return Ok(());
                }
                "href" => match self.classify_href(value, base) {
                    Href::Unparseable => continue,
                    Href::Asset => {
                        page.assets.push(value.to_string());
                        return Ok(());
                    }
                    Href::Child(url) => {
                        page.children.push(url.clone());
                        return self.publish(url);
                    }
                    Href::Ignored => return Ok(()),
                },
                _ => {}
            }
        }

        Ok(())
    }

    fn classify_href(&self, raw: &str, base: &Url) -> Href {
        // "./page" and "../page" lose their first dot
        let candidate = raw.strip_prefix('.').unwrap_or(raw);

        // References without a host take the crawl domain's host and scheme
        let url = match Url::parse(candidate) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match base.join(candidate) {
                Ok(url) => url,
                Err(_) => return Href::Unparseable,
            },
            Err(_) => return Href::Unparseable,
        };

        if url.scheme() == "javascript" {
            return Href::Asset;
        }

        let text = url.as_str();
        if ASSET_MARKERS.iter().any(|marker| text.contains(marker)) {
            return Href::Asset;
        }

        let host = authority(&url).unwrap_or_else(|| self.domain.host.clone());
        let in_domain = host == self.domain.host || host == self.domain.path;
        if !in_domain || text.contains("mailto") {
            return Href::Ignored;
        }

        // Serialized form, so "http://host" and "/" name the same page
        Href::Child(url.into())
    }

    fn publish(&self, url: String) -> Result<()> {
        self.discovered
            .send_timeout(url, PUBLISH_TIMEOUT)
            .map_err(|e| CrawlError::PublishTimeout {
                url: e.into_inner(),
            })
    }
}

/// Parses an HTML body and classifies its references into a new page
///
/// This is synchronous: the parsed document is not `Send`, so callers on the
/// async runtime run it through `spawn_blocking`.
pub fn parse_page(
    body: &str,
    url: &str,
    domain: &DomainRef,
    discovered: &Sender<String>,
    started: Instant,
) -> Result<Page> {
    let document = Html::parse_document(body);
    let mut page = Page::default();

    LinkClassifier::new(domain, discovered, started).classify(Some(&document), Some(&mut page))?;

    page.url = url.to_string();
    Ok(page)
}
