use crate::state::Page;

/// Fixed-capacity, append-only collection of accepted pages
///
/// The capacity is the crawl's page budget. Entries keep the order in which
/// they were accepted and are never replaced.
#[derive(Debug, Clone)]
pub struct Sitemap {
    pages: Vec<Page>,
    capacity: usize,
}

impl Sitemap {
    /// Creates an empty sitemap holding at most `capacity` pages
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: Vec::new(),
            capacity,
        }
    }

    /// Appends a page if there is room left
    ///
    /// Returns the page back when the sitemap is already full.
    pub fn push(&mut self, page: Page) -> Result<(), Page> {
        if self.is_full() {
            return Err(page);
        }
        self.pages.push(page);
        Ok(())
    }

    /// Number of pages stored so far
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true once no more pages can be accepted
    pub fn is_full(&self) -> bool {
        self.pages.len() >= self.capacity
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }
}

impl<'a> IntoIterator for &'a Sitemap {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
