//! Live counter: current time and whole days elapsed since a start instant.
//!
//! [`LiveCounter::snapshot`] is a pure function of the injected "now", so the
//! display can be tested without wall-clock timers. [`Ticker`] drives it on a
//! fixed cadence in the terminal.

mod ticker;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::ConfigurationError;
use crate::datetime;

pub use ticker::Ticker;

/// Placeholder for values an inert counter cannot show.
pub const INERT_VALUE: &str = "--";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now".
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        datetime::local_now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterStatus {
    Active,
    /// The configured start instant could not be parsed.
    InvalidConfiguration,
}

impl std::fmt::Display for CounterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::InvalidConfiguration => write!(f, "Invalid configuration"),
        }
    }
}

/// Everything the counter display shows for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub status: CounterStatus,
    /// Start instant, `dd/mm/yyyy hh:mm:ss`.
    pub start: String,
    /// Current instant, `dd/mm/yyyy hh:mm:ss`.
    pub now: String,
    pub elapsed_days: Option<i64>,
    /// `"12 days"`.
    pub elapsed_label: String,
    /// Largest-unit distance, e.g. `"3 hours"` on the first day.
    pub since: String,
    /// Why the counter is inert, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counter bound to a configured start instant.
#[derive(Debug, Clone)]
pub struct LiveCounter {
    start: Result<NaiveDateTime, ConfigurationError>,
}

impl LiveCounter {
    pub fn new(start: Result<NaiveDateTime, ConfigurationError>) -> Self {
        Self { start }
    }

    /// Parse the configured `dd/mm/yyyy hh:mm` start text.
    pub fn from_start_text(text: &str) -> Self {
        let start = datetime::parse_fixed_datetime(text).map_err(|source| {
            ConfigurationError::InvalidStart {
                value: text.to_string(),
                source,
            }
        });
        Self { start }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_ok()
    }

    /// Render the counter for `now`.
    pub fn snapshot(&self, now: &NaiveDateTime) -> CounterSnapshot {
        match &self.start {
            Ok(start) => {
                let days = datetime::elapsed_days(start, now);
                CounterSnapshot {
                    status: CounterStatus::Active,
                    start: datetime::format_instant(start),
                    now: datetime::format_instant(now),
                    elapsed_days: Some(days),
                    elapsed_label: datetime::pluralize(days, "day"),
                    since: datetime::human_elapsed(start, now),
                    error: None,
                }
            }
            Err(e) => CounterSnapshot {
                status: CounterStatus::InvalidConfiguration,
                start: INERT_VALUE.to_string(),
                now: datetime::format_instant(now),
                elapsed_days: None,
                elapsed_label: INERT_VALUE.to_string(),
                since: INERT_VALUE.to_string(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Render the counter for the clock's current time.
    pub fn tick(&self, clock: &dyn Clock) -> CounterSnapshot {
        self.snapshot(&clock.now())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
