//! Date-time utility for the fixed `dd/mm/yyyy hh:mm` text format.
//!
//! Everything that reads or prints an instant goes through this module:
//! - **Parsing**: positional `day/month/year [hour:minute]`, never locale-aware
//! - **Formatting**: zero-padded 24-hour `dd/mm/yyyy hh:mm:ss`
//! - **Elapsed time**: largest-unit human text and whole elapsed days
//!
//! Instants are local wall-clock date-times ([`NaiveDateTime`]). Components
//! outside their natural range roll over instead of failing, so
//! `31/04/2025` is the 1st of May and `01/13/2025` is January 2026.
//! Elapsed time is measured on the real timeline: both ends are placed in
//! the local time zone first, so a daylight-saving shift in between counts
//! as the hour it really was.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use thiserror::Error;

/// Display format used for "now" and for every rendered instant.
pub const INSTANT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Display format without seconds, matching the configuration text.
pub const MINUTE_FORMAT: &str = "%d/%m/%Y %H:%M";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// How far before a skipped wall time to look for the offset in force.
const GAP_LOOKBEHIND_HOURS: i64 = 3;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("expected day/month/year in {text:?}")]
    MissingComponent { text: String },

    #[error("non-numeric {component} {value:?} in {text:?}")]
    NotNumeric {
        component: &'static str,
        value: String,
        text: String,
    },

    #[error("date {text:?} is outside the supported range")]
    OutOfRange { text: String },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `dd/mm/yyyy hh:mm` (time optional) into an instant.
///
/// The text is split on single spaces: the first segment is the date, the
/// second (if present and non-empty) the time. A missing time means
/// midnight. Day, month, hour and minute overflow into the next larger unit.
pub fn parse_fixed_datetime(text: &str) -> Result<NaiveDateTime, DateTimeError> {
    let mut segments = text.trim().split(' ');
    let date_part = segments.next().unwrap_or_default();
    let time_part = segments.next().filter(|s| !s.is_empty());

    let mut date_fields = date_part.split('/');
    let (Some(day), Some(month), Some(year)) =
        (date_fields.next(), date_fields.next(), date_fields.next())
    else {
        return Err(DateTimeError::MissingComponent {
            text: text.to_string(),
        });
    };

    let day = number("day", day, text)?;
    let month = number("month", month, text)?;
    let year = number("year", year, text)?;

    let (hour, minute) = match time_part {
        Some(time) => {
            let mut time_fields = time.split(':');
            let hour = number("hour", time_fields.next().unwrap_or_default(), text)?;
            let minute = number("minute", time_fields.next().unwrap_or_default(), text)?;
            (hour, minute)
        }
        None => (0, 0),
    };

    build_instant(year, month, day, hour, minute).ok_or_else(|| DateTimeError::OutOfRange {
        text: text.to_string(),
    })
}

fn number(component: &'static str, value: &str, text: &str) -> Result<i64, DateTimeError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| DateTimeError::NotNumeric {
            component,
            value: value.to_string(),
            text: text.to_string(),
        })
}

/// Build an instant from 1-based month text, letting every field roll over.
fn build_instant(year: i64, month: i64, day: i64, hour: i64, minute: i64) -> Option<NaiveDateTime> {
    let month_index = month.checked_sub(1)?;
    let year = year.checked_add(month_index.div_euclid(12))?;
    let month0 = u32::try_from(month_index.rem_euclid(12)).ok()?;

    let first_of_month = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month0 + 1, 1)?;
    first_of_month
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)?
        .checked_add_signed(Duration::try_hours(hour)?)?
        .checked_add_signed(Duration::try_minutes(minute)?)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `dd/mm/yyyy hh:mm:ss`, 24-hour clock.
pub fn format_instant(instant: &NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

/// `dd/mm/yyyy hh:mm`, for echoing configured instants.
pub fn format_minutes(instant: &NaiveDateTime) -> String {
    instant.format(MINUTE_FORMAT).to_string()
}

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Place a wall-clock instant on the timeline of `tz`.
///
/// A time repeated by a backward shift resolves to its first occurrence.
/// A time skipped by a forward shift keeps the offset in force before the
/// gap, which moves it past the gap (`01:30` reads as `02:30`).
pub fn resolve_wall_time<Tz: TimeZone>(tz: &Tz, wall: &NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(wall) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let offset_before = Duration::try_hours(GAP_LOOKBEHIND_HOURS)
                .and_then(|lookbehind| wall.checked_sub_signed(lookbehind))
                .and_then(|before| tz.from_local_datetime(&before).earliest())
                .map_or(0, |before| before.offset().fix().local_minus_utc());
            let utc = Duration::try_seconds(i64::from(offset_before))
                .and_then(|offset| wall.checked_sub_signed(offset))
                .unwrap_or(*wall);
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Real time between two local wall-clock instants.
fn local_elapsed(start: &NaiveDateTime, end: &NaiveDateTime) -> Duration {
    resolve_wall_time(&Local, end) - resolve_wall_time(&Local, start)
}

// ---------------------------------------------------------------------------
// Elapsed time
// ---------------------------------------------------------------------------

/// `"{n} {unit}"` with an `s` for every count except exactly one.
pub fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Human-readable distance between two instants using the largest
/// non-zero unit: days, then hours, then minutes.
///
/// The distance is absolute, so argument order only matters for callers.
pub fn human_elapsed(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    let diff = local_elapsed(start, end).abs();

    let days = diff.num_days();
    if days > 0 {
        return pluralize(days, "day");
    }
    let hours = diff.num_hours();
    if hours > 0 {
        return pluralize(hours, "hour");
    }
    pluralize(diff.num_minutes(), "minute")
}

/// Whole days from `start` to `now`, flooring the millisecond difference.
///
/// Negative when `now` is before `start`.
pub fn elapsed_days(start: &NaiveDateTime, now: &NaiveDateTime) -> i64 {
    local_elapsed(start, now)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> NaiveDateTime {
        parse_fixed_datetime(text).unwrap()
    }

    #[test]
    fn parses_date_and_time_positionally() {
        let instant = at("17/07/2025 17:33");
        assert_eq!(format_instant(&instant), "17/07/2025 17:33:00");
    }

    #[test]
    fn missing_time_is_midnight() {
        assert_eq!(format_instant(&at("01/01/2025")), "01/01/2025 00:00:00");
    }

    #[test]
    fn unpadded_components_are_accepted() {
        assert_eq!(format_minutes(&at("5/3/2024 9:07")), "05/03/2024 09:07");
    }

    #[test]
    fn day_overflow_rolls_into_next_month() {
        assert_eq!(format_minutes(&at("31/04/2025")), "01/05/2025 00:00");
        assert_eq!(format_minutes(&at("30/02/2024")), "01/03/2024 00:00");
    }

    #[test]
    fn month_overflow_rolls_into_next_year() {
        assert_eq!(format_minutes(&at("01/13/2025")), "01/01/2026 00:00");
    }

    #[test]
    fn zero_day_is_last_day_of_previous_month() {
        assert_eq!(format_minutes(&at("00/03/2025")), "28/02/2025 00:00");
    }

    #[test]
    fn hour_overflow_rolls_into_next_day() {
        assert_eq!(format_minutes(&at("10/10/2025 24:30")), "11/10/2025 00:30");
    }

    #[test]
    fn rejects_non_numeric_components() {
        let err = parse_fixed_datetime("aa/01/2025").unwrap_err();
        assert!(matches!(err, DateTimeError::NotNumeric { component: "day", .. }));

        let err = parse_fixed_datetime("01/01/2025 noon").unwrap_err();
        assert!(matches!(err, DateTimeError::NotNumeric { component: "hour", .. }));
    }

    #[test]
    fn rejects_missing_components() {
        assert!(matches!(
            parse_fixed_datetime("01/2025"),
            Err(DateTimeError::MissingComponent { .. })
        ));
        assert!(matches!(
            parse_fixed_datetime(""),
            Err(DateTimeError::MissingComponent { .. })
        ));
    }

    #[test]
    fn hour_without_minutes_is_rejected() {
        assert!(parse_fixed_datetime("01/01/2025 10").is_err());
    }

    #[test]
    fn round_trips_date_and_time() {
        for text in ["01/01/2000 00:00", "29/02/2024 23:59", "17/07/2025 17:33"] {
            assert_eq!(format_minutes(&at(text)), text);
        }
    }

    #[test]
    fn pluralize_only_drops_suffix_for_one() {
        assert_eq!(pluralize(1, "day"), "1 day");
        assert_eq!(pluralize(0, "day"), "0 days");
        assert_eq!(pluralize(2, "hour"), "2 hours");
    }

    #[test]
    fn human_elapsed_uses_largest_unit() {
        let t = at("01/01/2025 00:00");
        assert_eq!(human_elapsed(&t, &t), "0 minutes");
        assert_eq!(human_elapsed(&t, &(t + Duration::hours(25))), "1 day");
        assert_eq!(human_elapsed(&t, &(t + Duration::minutes(90))), "1 hour");
        assert_eq!(human_elapsed(&t, &(t + Duration::minutes(5))), "5 minutes");
        assert_eq!(human_elapsed(&t, &(t + Duration::days(3))), "3 days");
    }

    #[test]
    fn human_elapsed_ignores_sub_minute_remainder() {
        let t = at("01/01/2025 00:00");
        assert_eq!(human_elapsed(&t, &(t + Duration::seconds(59))), "0 minutes");
    }

    #[test]
    fn human_elapsed_is_absolute() {
        let t = at("01/01/2025 00:00");
        assert_eq!(human_elapsed(&(t + Duration::hours(2)), &t), "2 hours");
    }

    #[test]
    fn elapsed_days_floors() {
        let start = at("17/07/2025 17:33");
        assert_eq!(elapsed_days(&start, &at("18/07/2025 17:32")), 0);
        assert_eq!(elapsed_days(&start, &at("18/07/2025 17:33")), 1);
        assert_eq!(elapsed_days(&start, &at("17/07/2025 17:32")), -1);
    }

    #[test]
    fn resolve_wall_time_applies_zone_offset() {
        let wall = at("17/07/2025 17:33");
        let plus_one = chrono::FixedOffset::east_opt(3600).unwrap();
        let resolved = resolve_wall_time(&plus_one, &wall);
        assert_eq!(resolved.naive_local(), wall);
        assert_eq!(resolved.naive_utc(), at("17/07/2025 16:33"));
        assert_eq!(resolve_wall_time(&chrono::Utc, &wall).naive_utc(), wall);
    }
}
