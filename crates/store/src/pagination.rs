//! Page arithmetic for result listings.

use serde::Serialize;

/// Position of one page within a listing of `total_items`.
///
/// Pages are 1-based. Indices are clamped to the listing, so
/// `items[start_index..end_index]` is always a valid slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    /// Compute the page layout. A page of 0 is treated as page 1 and a page
    /// size of 0 as 1.
    pub fn new(current_page: usize, total_items: usize, per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let per_page = per_page.max(1);

        let end_index = current_page.saturating_mul(per_page).min(total_items);
        let start_index = ((current_page - 1).saturating_mul(per_page)).min(end_index);

        Self {
            current_page,
            total_pages: total_items.div_ceil(per_page),
            start_index,
            end_index,
            has_next: current_page.saturating_mul(per_page) < total_items,
            has_previous: current_page > 1,
        }
    }

    /// The slice of `items` this page covers.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index.min(items.len());
        let start = self.start_index.min(end);
        &items[start..end]
    }
}
