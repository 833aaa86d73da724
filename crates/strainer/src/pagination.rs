//! Page arithmetic.

use serde::Serialize;

/// The page window over a scope's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page, 1-based.
    pub page: usize,
    pub per_page: usize,
    /// Rows in the whole scope.
    pub total: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
}

impl Pagination {
    /// Computes the window. `page` and `per_page` below 1 are treated as 1.
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let per_page = per_page.max(1);
        Self {
            page: page.max(1),
            per_page,
            total,
            total_pages: total.div_ceil(per_page).max(1),
        }
    }

    /// Rows to skip before the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// `true` when the page lies beyond the last page.
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.total_pages
    }
}
