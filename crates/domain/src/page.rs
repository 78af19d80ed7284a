//! Pagination types for list endpoints

use serde::{Deserialize, Serialize};

/// Largest page the backend serves.
pub const MAX_PER_PAGE: u32 = 100;

/// Default page size used by the console tables.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page, 1..=100
    pub per_page: u32,
}

impl PageQuery {
    /// Creates a page request, clamping out-of-range values.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Returns the request for the following page.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            per_page: self.per_page,
        }
    }

    /// Returns the query-string pairs for this page.
    #[must_use]
    pub fn to_query(self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ]
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total items across all pages
    pub total: u64,
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Returns the number of pages needed for `total` items.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }

    /// Returns true if a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_query_clamps() {
        assert_eq!(PageQuery::new(0, 0), PageQuery { page: 1, per_page: 1 });
        assert_eq!(PageQuery::new(3, 500).per_page, MAX_PER_PAGE);
        assert_eq!(PageQuery::default().next().page, 2);
    }

    #[test]
    fn test_to_query() {
        assert_eq!(
            PageQuery::new(2, 50).to_query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::<u8> {
            items: vec![],
            total: 41,
            page: 2,
            per_page: 20,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last = Page::<u8> { page: 3, ..page };
        assert!(!last.has_next());
    }
}
