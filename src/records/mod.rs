//! Dated records and the canonical record set.
//!
//! A [`Record`] is one entry of the tracked history as it appears in the
//! JSON resource. The original object is kept verbatim and is what export
//! writes back; the text fields are views derived from it for filtering,
//! sorting and rendering. Derivation is tolerant: missing or null fields
//! read as empty and numbers read as their decimal text.

pub mod export;
pub mod store;

use std::sync::{Arc, LazyLock};

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::datetime;

pub use export::{ExportError, export_file_name, export_snapshot, write_export};
pub use store::{DataSource, LoadError, load};

/// Leading integer of a free-text count, e.g. `"12"` in `"12 days"`.
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer regex"));

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

const DATE_KEY: &str = "date";
const TIME_KEY: &str = "time";
const DAYS_KEY: &str = "daysGoneBy";

/// One entry in the tracked history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Calendar date as `dd/mm/yyyy` text.
    pub date: String,
    /// Optional `hh:mm` time of day.
    pub time: Option<String>,
    /// Free-text duration label whose numeric prefix is the day count.
    pub days_gone_by: String,
    raw: Map<String, Value>,
}

impl Record {
    pub fn new(date: &str, time: Option<&str>, days_gone_by: &str) -> Self {
        let mut raw = Map::new();
        raw.insert(DATE_KEY.to_string(), Value::from(date));
        if let Some(time) = time {
            raw.insert(TIME_KEY.to_string(), Value::from(time));
        }
        raw.insert(DAYS_KEY.to_string(), Value::from(days_gone_by));
        Self::from_raw(raw)
    }

    /// Derive the text views from a source object, keeping it for export.
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        Self {
            date: text(raw.get(DATE_KEY)).unwrap_or_default(),
            time: text(raw.get(TIME_KEY)),
            days_gone_by: text(raw.get(DAYS_KEY)).unwrap_or_default(),
            raw,
        }
    }

    /// A field of the source object exactly as loaded.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// The time of day, treating an empty string as absent.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Numeric prefix of `daysGoneBy`; zero when there is none.
    pub fn day_count(&self) -> i64 {
        leading_int(&self.days_gone_by)
    }

    /// Month component (second field) of the date text.
    pub fn month_component(&self) -> Option<&str> {
        self.date.split('/').nth(1)
    }

    /// Year component (third field) of the date text.
    pub fn year_component(&self) -> Option<&str> {
        self.date.split('/').nth(2)
    }

    /// Date combined with time (midnight when absent), for ordering only.
    ///
    /// `None` when the date text cannot be parsed.
    pub fn effective_datetime(&self) -> Option<NaiveDateTime> {
        let time = self.time().unwrap_or("00:00");
        datetime::parse_fixed_datetime(&format!("{} {}", self.date.trim(), time.trim())).ok()
    }
}

/// Parse the leading integer of `text`, saturating on overflow.
pub fn leading_int(text: &str) -> i64 {
    let Some(caps) = LEADING_INT_RE.captures(text) else {
        return 0;
    };
    let digits = &caps[1];
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Text view of a source field; `None` for a missing or null field.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_raw)
    }
}

// ---------------------------------------------------------------------------
// Canonical set
// ---------------------------------------------------------------------------

/// The full record collection as last successfully loaded.
///
/// Immutable once built; cloning shares the underlying records.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    canonical: Arc<Vec<Record>>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            canonical: Arc::new(records),
        }
    }

    pub fn canonical(&self) -> &[Record] {
        &self.canonical
    }

    /// A fresh copy of the canonical set, discarding any filter.
    pub fn reset(&self) -> Vec<Record> {
        self.canonical.to_vec()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
