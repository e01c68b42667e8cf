//! Pagination controller: 1-based pages over the active view.
//!
//! [`Pagination`] is a small `Copy` value; navigation returns a new value
//! rather than mutating in place. Out-of-bounds navigation is a no-op.

use std::ops::Range;

use serde::Serialize;

/// Page size used when configuration does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Info text shown for an empty view.
pub const NO_RECORDS: &str = "No records found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

/// Navigation and info state for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub info: String,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Start on page 1. A zero page size is treated as one record per page;
    /// configuration validation rejects it before it gets here.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(view_len / page_size)`; zero for an empty view.
    pub fn total_pages(&self, view_len: usize) -> usize {
        view_len.div_ceil(self.page_size)
    }

    /// Index range of the current page, clipped to the view.
    pub fn slice_range(&self, view_len: usize) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.page_size).min(view_len);
        let end = start.saturating_add(self.page_size).min(view_len);
        start..end
    }

    /// The records visible on the current page.
    pub fn visible<'a, T>(&self, view: &'a [T]) -> &'a [T] {
        &view[self.slice_range(view.len())]
    }

    /// Back to page 1 with the same page size.
    pub fn first_page(self) -> Self {
        Self { page: 1, ..self }
    }

    /// Advance one page when a later page exists.
    pub fn next(self, view_len: usize) -> Self {
        if self.page < self.total_pages(view_len) {
            Self {
                page: self.page + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Go back one page when not already on the first.
    pub fn previous(self) -> Self {
        if self.page > 1 {
            Self {
                page: self.page - 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Jump to `page`, clamped to `1..=total_pages` (page 1 for an empty view).
    pub fn go_to(self, page: usize, view_len: usize) -> Self {
        let last = self.total_pages(view_len).max(1);
        Self {
            page: page.clamp(1, last),
            ..self
        }
    }

    pub fn controls(&self, view_len: usize) -> PageControls {
        let total_pages = self.total_pages(view_len);
        PageControls {
            page: self.page,
            total_pages,
            total_records: view_len,
            previous_disabled: self.page <= 1,
            next_disabled: self.page >= total_pages,
            info: info_text(self.page, total_pages, view_len),
        }
    }
}

/// `"Page 2 of 3 (23 records)"`, or [`NO_RECORDS`] for an empty view.
pub fn info_text(page: usize, total_pages: usize, view_len: usize) -> String {
    if view_len == 0 {
        NO_RECORDS.to_string()
    } else {
        format!("Page {page} of {total_pages} ({view_len} records)")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination::new(10);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        assert_eq!(p.total_pages(23), 3);
    }

    #[test]
    fn last_page_holds_remainder() {
        let view: Vec<usize> = (0..23).collect();
        let p = Pagination::new(10).next(23).next(23);
        assert_eq!(p.page(), 3);
        assert_eq!(p.visible(&view), &[20, 21, 22]);
    }

    #[test]
    fn next_stops_at_last_page() {
        let p = Pagination::new(10).go_to(3, 23);
        assert_eq!(p.next(23), p);
        assert!(p.controls(23).next_disabled);
        assert!(!p.controls(23).previous_disabled);
    }

    #[test]
    fn previous_stops_at_first_page() {
        let p = Pagination::new(10);
        assert_eq!(p.previous(), p);
        assert!(p.controls(23).previous_disabled);
        assert!(!p.controls(23).next_disabled);
    }

    #[test]
    fn empty_view_disables_everything() {
        let p = Pagination::new(10);
        assert_eq!(p.next(0), p);
        assert_eq!(p.previous(), p);
        assert!(p.visible::<u8>(&[]).is_empty());

        let controls = p.controls(0);
        assert_eq!(controls.total_pages, 0);
        assert!(controls.previous_disabled);
        assert!(controls.next_disabled);
        assert_eq!(controls.info, NO_RECORDS);
    }

    #[test]
    fn info_text_reports_page_and_count() {
        let p = Pagination::new(10).next(23);
        assert_eq!(p.controls(23).info, "Page 2 of 3 (23 records)");
    }

    #[test]
    fn go_to_clamps() {
        let p = Pagination::new(5);
        assert_eq!(p.go_to(0, 12).page(), 1);
        assert_eq!(p.go_to(99, 12).page(), 3);
        assert_eq!(p.go_to(4, 0).page(), 1);
    }

    #[test]
    fn stale_page_beyond_view_yields_empty_slice() {
        let p = Pagination::new(10).go_to(3, 23);
        let shorter: Vec<usize> = (0..5).collect();
        assert!(p.visible(&shorter).is_empty());
    }

    #[test]
    fn first_page_keeps_size() {
        let p = Pagination::new(4).go_to(3, 12).first_page();
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 4);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(Pagination::new(0).page_size(), 1);
    }
}
