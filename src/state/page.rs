/// A fetched page and the references found in its markup
///
/// A `Page` is built by a single worker and never modified after it has been
/// handed to the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// The URL the page was fetched from
    pub url: String,

    /// Static assets (images, scripts, stylesheets, `javascript:` hrefs)
    /// in document order, duplicates included
    pub assets: Vec<String>,

    /// Absolute in-domain URLs linked from this page, in document order
    pub children: Vec<String>,
}

impl Page {
    /// Creates an empty page for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Key used to decide whether two pages are the same
    ///
    /// Pages are compared by their asset lists, not by URL: two addresses
    /// serving identical assets count as one page.
    pub fn signature(&self) -> String {
        self.assets.join(" ")
    }
}
