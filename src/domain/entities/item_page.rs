//! Paged fetch responses.

use super::Item;

/// Opaque cursor marking where the next page of results starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    /// Token of the very first page.
    pub const FIRST: &'static str = "0";

    /// Wraps an opaque token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token of the first page.
    #[must_use]
    pub fn first() -> Self {
        Self::new(Self::FIRST)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PageToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u32> for PageToken {
    fn from(page: u32) -> Self {
        Self(page.to_string())
    }
}

/// One page of search results as returned by the catalog.
#[derive(Debug, Clone)]
pub struct ItemPage {
    /// The query as echoed back by the catalog.
    pub query: String,
    /// Cursor of the following page; `None` once results are exhausted.
    pub next_page_token: Option<PageToken>,
    /// Results in catalog order.
    pub items: Vec<Item>,
}

impl ItemPage {
    /// Creates a page.
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        next_page_token: Option<PageToken>,
        items: Vec<Item>,
    ) -> Self {
        Self {
            query: query.into(),
            next_page_token,
            items,
        }
    }

    /// Returns true if no further pages follow this one.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}
