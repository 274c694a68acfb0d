//! Time-of-day helpers and the half-open overlap predicate.
//!
//! Occurrences are plain local wall-clock datetimes (`NaiveDateTime`). The only
//! place a timezone enters is [`local_now`], which turns "now" into the wall clock
//! of the configured zone before the week is anchored.

use crate::error::{Result, ScheduleError};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

/// Midnight of the Monday of the week containing `reference`.
///
/// Weekdays are numbered Sunday=0..Saturday=6; the number of days subtracted is
/// `(weekday + 6) mod 7`, so a Sunday belongs to the week that started six days
/// earlier.
pub fn week_anchor(reference: NaiveDateTime) -> NaiveDateTime {
    let weekday = reference.weekday().num_days_from_sunday();
    let back = (weekday + 6) % 7;
    let monday = reference.date() - chrono::Duration::days(i64::from(back));
    monday.and_time(NaiveTime::MIN)
}

/// Format the time-of-day portion as zero-padded 24-hour `HH:MM:SS`.
pub fn format_time_of_day<T: Timelike>(instant: T) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}

/// Parse `HH:MM:SS` or `HH:MM` (seconds default to zero).
///
/// # Errors
/// Returns `ScheduleError::InvalidTime` for anything else.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

/// Half-open interval overlap: `[start_a, end_a)` and `[start_b, end_b)` overlap
/// iff `start_a < end_b && end_a > start_b`.
///
/// Adjacent intervals (one ends exactly when the other starts) do not overlap.
/// Empty or inverted intervals never overlap anything, which keeps the predicate
/// symmetric for degenerate input.
pub fn overlaps<T: PartialOrd>(start_a: T, end_a: T, start_b: T, end_b: T) -> bool {
    if start_a >= end_a || start_b >= end_b {
        return false;
    }
    start_a < end_b && end_a > start_b
}

/// Current wall-clock time in `tz`.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}
