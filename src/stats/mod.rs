//! Summary statistics for the active view.

use serde::Serialize;

use crate::records::Record;

/// Shown in place of a statistic that an empty view cannot provide.
pub const EMPTY_STAT: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_records: usize,
    /// Mean day count, one decimal: `"6.5 days"`.
    pub average_duration: String,
    /// Date of the newest record.
    pub last_record: String,
}

/// Summarize a view that is already sorted newest-first.
pub fn summarize(sorted_view: &[Record]) -> Summary {
    let Some(newest) = sorted_view.first() else {
        return Summary {
            total_records: 0,
            average_duration: EMPTY_STAT.to_string(),
            last_record: EMPTY_STAT.to_string(),
        };
    };

    let total: i128 = sorted_view.iter().map(|r| i128::from(r.day_count())).sum();
    let average = total as f64 / sorted_view.len() as f64;

    Summary {
        total_records: sorted_view.len(),
        average_duration: format!("{} days", one_decimal(average)),
        last_record: newest.date.clone(),
    }
}

/// One decimal place, halves rounded away from zero (`1.25` → `"1.3"`).
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}
