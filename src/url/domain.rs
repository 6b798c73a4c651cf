use crate::{CrawlError, Result};
use std::fmt;
use url::Url;

/// The scheme and host that scope a crawl
///
/// Unlike [`Url`], a `DomainRef` can hold an empty scheme or host. Parsing is
/// lenient so that [`check_domain`] is the single place that decides whether
/// a reference is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRef {
    /// URL scheme, e.g. `http`
    pub scheme: String,

    /// Host including an explicit port, e.g. `example.com` or `127.0.0.1:8080`
    pub host: String,

    /// Path of the reference, or the raw input when it had no scheme
    pub path: String,

    /// Query string without the leading `?`
    pub query: Option<String>,
}

impl DomainRef {
    /// Parses a domain reference without rejecting anything
    ///
    /// Inputs that are not absolute URLs keep their text in `path` and leave
    /// scheme and host empty.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => Self {
                scheme: url.scheme().to_string(),
                host: authority(&url).unwrap_or_default(),
                path: url.path().to_string(),
                query: url.query().map(str::to_string),
            },
            Err(url::ParseError::EmptyHost) => Self {
                scheme: input
                    .split_once(':')
                    .map(|(scheme, _)| scheme.to_string())
                    .unwrap_or_default(),
                host: String::new(),
                path: String::new(),
                query: None,
            },
            Err(_) => Self {
                scheme: String::new(),
                host: String::new(),
                path: input.to_string(),
                query: None,
            },
        }
    }

    /// Checks that scheme and host are present without normalizing
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(CrawlError::InvalidDomain(format!(
                "unable to find a host in '{}'",
                self
            )));
        }

        if self.scheme.is_empty() {
            return Err(CrawlError::InvalidDomain(format!(
                "a scheme is required (ex: http), got '{}'",
                self
            )));
        }

        Ok(())
    }

    /// Base URL (`scheme://host/`) used to resolve relative references
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&format!("{}://{}/", self.scheme, self.host))
            .map_err(|e| CrawlError::InvalidDomain(format!("{}: {}", self, e)))
    }

    /// The host without any port, used for default report names
    pub fn hostname(&self) -> &str {
        self.host
            .rsplit_once(':')
            .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
            .map(|(name, _)| name)
            .unwrap_or(&self.host)
    }
}

impl fmt::Display for DomainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }
        if !self.host.is_empty() {
            write!(f, "//{}", self.host)?;
        }
        write!(f, "{}", self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

/// Validates a domain reference and strips a leading `www.` from its host
///
/// # Errors
///
/// Returns `CrawlError::InvalidDomain` when the host or scheme is empty.
///
/// # Examples
///
/// ```
/// use petit_crawl::url::{check_domain, DomainRef};
///
/// let mut domain = DomainRef::parse("http://www.example.com");
/// check_domain(&mut domain).unwrap();
/// assert_eq!(domain.host, "example.com");
/// ```
pub fn check_domain(domain: &mut DomainRef) -> Result<()> {
    domain.validate()?;

    if let Some(stripped) = domain.host.strip_prefix("www.") {
        domain.host = stripped.to_string();
    }

    // "www." alone would leave nothing to compare against
    domain.validate()
}

/// Returns `host[:port]` of a URL, or `None` for URLs without a host
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
