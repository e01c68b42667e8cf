//! Filter engine: AND-combined, independently optional record criteria.
//!
//! | criterion  | keeps records whose…                                   |
//! |------------|--------------------------------------------------------|
//! | `date`     | date text equals the criterion exactly                 |
//! | `month`    | month component equals the criterion numerically       |
//! | `year`     | year component equals the criterion text               |
//! | `duration` | `daysGoneBy` contains the criterion, case-insensitively |
//!
//! Blank criteria are ignored. Filtering always starts from the canonical
//! set and never mutates it.

use serde::{Deserialize, Serialize};

use crate::records::Record;

/// User-supplied filter criteria. `None` and blank values are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub duration: Option<String>,
}

impl FilterCriteria {
    /// Trim every field and drop blank ones.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            date: clean(self.date),
            month: clean(self.month),
            year: clean(self.year),
            duration: clean(self.duration),
        }
    }

    /// True when no criterion would restrict the view.
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.date) && blank(&self.month) && blank(&self.year) && blank(&self.duration)
    }

    /// Whether a record satisfies every provided criterion.
    ///
    /// Expects criteria already passed through [`Self::normalized`].
    fn matches_normalized(&self, record: &Record) -> bool {
        if let Some(date) = &self.date
            && record.date != *date
        {
            return false;
        }

        if let Some(month) = &self.month
            && !month_matches(record, month)
        {
            return false;
        }

        if let Some(year) = &self.year
            && record.year_component() != Some(year.as_str())
        {
            return false;
        }

        if let Some(duration) = &self.duration
            && !record
                .days_gone_by
                .to_lowercase()
                .contains(&duration.to_lowercase())
        {
            return false;
        }

        true
    }

    /// One-line description for logs, e.g. `month=7, year=2025`.
    pub fn describe(&self) -> String {
        let criteria = self.clone().normalized();
        let parts: Vec<String> = [
            ("date", &criteria.date),
            ("month", &criteria.month),
            ("year", &criteria.year),
            ("duration", &criteria.duration),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
        .collect();

        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Numeric month comparison so `"7"` and `"07"` are the same month.
///
/// A criterion or record month that is not a number never matches.
fn month_matches(record: &Record, month: &str) -> bool {
    let Ok(wanted) = month.parse::<u32>() else {
        return false;
    };
    record
        .month_component()
        .and_then(|m| m.trim().parse::<u32>().ok())
        == Some(wanted)
}

/// Derive a new view from the canonical set.
pub fn apply_filters(canonical: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    let criteria = criteria.clone().normalized();
    if criteria.is_empty() {
        return canonical.to_vec();
    }
    canonical
        .iter()
        .filter(|record| criteria.matches_normalized(record))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("01/01/2025", None, "3 days"),
            Record::new("15/06/2025", Some("12:00"), "10 days"),
            Record::new("20/06/2024", Some("08:30"), "1 Day"),
            Record::new("7/7/2025", None, "about a week"),
        ]
    }

    fn criteria(date: &str, month: &str, year: &str, duration: &str) -> FilterCriteria {
        let opt = |s: &str| Some(s.to_string());
        FilterCriteria {
            date: opt(date),
            month: opt(month),
            year: opt(year),
            duration: opt(duration),
        }
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let records = sample();
        assert_eq!(apply_filters(&records, &FilterCriteria::default()), records);
        assert_eq!(apply_filters(&records, &criteria(" ", "", "", "  ")), records);
    }

    #[test]
    fn exact_date_is_string_equality() {
        let records = sample();
        let out = apply_filters(&records, &criteria("15/06/2025", "", "", ""));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "15/06/2025");

        // Semantically equal but textually different dates do not match.
        let out = apply_filters(&records, &criteria("07/07/2025", "", "", ""));
        assert!(out.is_empty());
    }

    #[test]
    fn month_matches_numerically() {
        let records = sample();
        assert_eq!(apply_filters(&records, &criteria("", "6", "", "")).len(), 2);
        assert_eq!(apply_filters(&records, &criteria("", "06", "", "")).len(), 2);

        let july = apply_filters(&records, &criteria("", "07", "", ""));
        assert_eq!(july.len(), 1);
        assert_eq!(july[0].date, "7/7/2025");
    }

    #[test]
    fn non_numeric_month_matches_nothing() {
        assert!(apply_filters(&sample(), &criteria("", "june", "", "")).is_empty());
    }

    #[test]
    fn year_is_text_equality() {
        let records = sample();
        assert_eq!(apply_filters(&records, &criteria("", "", "2025", "")).len(), 3);
        assert_eq!(apply_filters(&records, &criteria("", "", "2024", "")).len(), 1);
        assert!(apply_filters(&records, &criteria("", "", "25", "")).is_empty());
    }

    #[test]
    fn duration_is_case_insensitive_substring() {
        let records = sample();
        let out = apply_filters(&records, &criteria("", "", "", "DAY"));
        assert_eq!(out.len(), 3);

        let out = apply_filters(&records, &criteria("", "", "", "week"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn criteria_combine_with_and() {
        let records = sample();
        let out = apply_filters(&records, &criteria("", "6", "2025", ""));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "15/06/2025");

        let out = apply_filters(&records, &criteria("", "6", "2025", "1 day"));
        assert!(out.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = sample();
        let c = criteria("", "6", "", "day");
        let once = apply_filters(&records, &c);
        let twice = apply_filters(&once, &c);
        assert_eq!(once, twice);
    }

    #[test]
    fn canonical_set_is_untouched() {
        let records = sample();
        let before = records.clone();
        let _ = apply_filters(&records, &criteria("", "", "2024", ""));
        assert_eq!(records, before);
    }

    #[test]
    fn describe_lists_active_criteria() {
        assert_eq!(FilterCriteria::default().describe(), "none");
        assert_eq!(criteria("", " 7 ", "2025", "").describe(), "month=7, year=2025");
    }
}
