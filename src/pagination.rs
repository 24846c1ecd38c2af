//! Page/offset paging shared by every listing.

use serde::{Deserialize, Serialize};

/// `?page=` query parameter. Pages start at 1.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    /// Requested page, never below 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `page` out of `total` rows.
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let seen = i64::from(page) * i64::from(per_page);
        Self {
            items,
            page,
            per_page,
            total,
            has_next: seen < total,
            has_prev: page > 1,
        }
    }
}

/// `LIMIT` and `OFFSET` values for a 1-based `page`.
pub fn limit_offset(page: u32, per_page: u32) -> (i64, i64) {
    let page = page.max(1);
    let limit = i64::from(per_page);
    (limit, i64::from(page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset() {
        assert_eq!(limit_offset(1, 25), (25, 0));
        assert_eq!(limit_offset(3, 25), (25, 50));
        assert_eq!(limit_offset(0, 10), (10, 0));
    }

    #[test]
    fn test_page_flags() {
        let first = Page::new(vec![1, 2], 1, 2, 5);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = Page::new(vec![5], 3, 2, 5);
        assert!(!last.has_next);
        assert!(last.has_prev);

        let exact = Page::new(vec![1, 2], 1, 2, 2);
        assert!(!exact.has_next);
    }

    #[test]
    fn test_page_query_default() {
        assert_eq!(PageQuery::default().page(), 1);
        assert_eq!(PageQuery { page: Some(0) }.page(), 1);
        assert_eq!(PageQuery { page: Some(4) }.page(), 4);
    }
}
