//! Table renderer: newest-first ordering and the rows of one page.

use std::cmp::Reverse;

use serde::Serialize;

use crate::pagination::Pagination;
use crate::records::Record;

/// Shown in the time column for records without a time.
pub const TIME_PLACEHOLDER: &str = "-";

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub date: String,
    pub time: String,
    pub days_gone_by: String,
    /// Cosmetic bar width in percent, `0..=100`.
    pub progress: u8,
}

impl TableRow {
    pub fn from_record(record: &Record) -> Self {
        Self {
            date: record.date.clone(),
            time: record.time().unwrap_or(TIME_PLACEHOLDER).to_string(),
            days_gone_by: record.days_gone_by.clone(),
            progress: progress_percent(record),
        }
    }
}

/// Day count × 10, clamped to `0..=100`.
pub fn progress_percent(record: &Record) -> u8 {
    let percent = record.day_count().saturating_mul(10).clamp(0, 100);
    u8::try_from(percent).unwrap_or(100)
}

/// Sort descending by effective date+time.
///
/// Stable: equal instants keep their existing relative order. Records whose
/// date does not parse go last.
pub fn sort_descending(view: &mut [Record]) {
    view.sort_by_cached_key(|record| Reverse(record.effective_datetime()));
}

/// Sort a copy of the view and render the current page.
pub fn render_page(view: &[Record], pagination: &Pagination) -> Vec<TableRow> {
    let mut order: Vec<&Record> = view.iter().collect();
    order.sort_by_cached_key(|record| Reverse(record.effective_datetime()));

    pagination
        .visible(&order)
        .iter()
        .map(|record| TableRow::from_record(record))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
