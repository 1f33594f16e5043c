//! Offset pagination for the issue report.
//!
//! A window of `(0, 0)` means "every matching record, unpaged". Exports always
//! run against that window.

use serde::Serialize;

/// Page index and page size of one listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
}

impl PageWindow {
    /// Creates a window; negative values are clamped to zero.
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(0),
            per_page: per_page.max(0),
        }
    }

    /// The window that returns all records.
    pub fn unpaged() -> Self {
        Self { page: 0, per_page: 0 }
    }

    pub fn is_unpaged(&self) -> bool {
        self.per_page == 0
    }

    /// SQL `LIMIT`, `None` when unpaged.
    pub fn limit(&self) -> Option<i64> {
        if self.is_unpaged() {
            None
        } else {
            Some(self.per_page)
        }
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        if self.is_unpaged() {
            0
        } else {
            self.page.saturating_mul(self.per_page)
        }
    }

    /// Number of pages needed to show `total` records.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else if self.is_unpaged() {
            1
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }
}

/// Resolves the page size to use for an on-screen listing.
///
/// When `default_per_page` is 0 the listing is unlimited and 0 is returned.
/// Otherwise a missing request uses the default, and a non-positive or
/// oversized request is replaced by `max_per_page`.
pub fn clamp_per_page(requested: Option<i64>, default_per_page: i64, max_per_page: i64) -> i64 {
    if default_per_page == 0 {
        return 0;
    }

    let requested = requested.unwrap_or(default_per_page);
    if requested <= 0 || requested > max_per_page {
        max_per_page
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaged_window() {
        let window = PageWindow::unpaged();
        assert!(window.is_unpaged());
        assert_eq!(window.limit(), None);
        assert_eq!(window.offset(), 0);
        assert_eq!(window, PageWindow::new(0, 0));
    }

    #[test]
    fn test_paged_window_offset() {
        let window = PageWindow::new(3, 25);
        assert_eq!(window.limit(), Some(25));
        assert_eq!(window.offset(), 75);
    }

    #[test]
    fn test_negative_values_clamped() {
        let window = PageWindow::new(-2, -5);
        assert_eq!(window.page, 0);
        assert!(window.is_unpaged());
    }

    #[test]
    fn test_total_pages() {
        let window = PageWindow::new(0, 30);
        assert_eq!(window.total_pages(0), 0);
        assert_eq!(window.total_pages(1), 1);
        assert_eq!(window.total_pages(30), 1);
        assert_eq!(window.total_pages(31), 2);
        assert_eq!(PageWindow::unpaged().total_pages(500), 1);
    }

    #[test]
    fn test_clamp_per_page_defaults() {
        assert_eq!(clamp_per_page(None, 30, 200), 30);
        assert_eq!(clamp_per_page(Some(50), 30, 200), 50);
    }

    #[test]
    fn test_clamp_per_page_out_of_range() {
        assert_eq!(clamp_per_page(Some(0), 30, 200), 200);
        assert_eq!(clamp_per_page(Some(-1), 30, 200), 200);
        assert_eq!(clamp_per_page(Some(1000), 30, 200), 200);
    }

    #[test]
    fn test_clamp_per_page_unlimited_mode() {
        assert_eq!(clamp_per_page(Some(50), 0, 200), 0);
        assert_eq!(clamp_per_page(None, 0, 200), 0);
    }

    #[test]
    fn test_window_serialization() {
        let json = serde_json::to_string(&PageWindow::new(1, 20)).unwrap();
        assert_eq!(json, r#"{"page":1,"per_page":20}"#);
    }
}
