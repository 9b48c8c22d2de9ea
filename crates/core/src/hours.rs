//! Restaurant opening hours.
//!
//! Hours are a list of per-weekday intervals in the restaurant's local time.
//! An empty list means the restaurant never closes. When the list is not
//! empty, a weekday missing from it is a closed day. An interval whose
//! `close` is not after `open` runs past midnight into the next day.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const TIME_FORMAT: &str = "%H:%M";

/// Largest accepted UTC offset (UTC+14 / UTC-14), in minutes.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Opening interval for one weekday, e.g. `{"day": "friday", "open": "17:00", "close": "01:00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: String,
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    day: Weekday,
    open: NaiveTime,
    close: NaiveTime,
}

impl Interval {
    fn overnight(&self) -> bool {
        self.close <= self.open
    }
}

fn parse_day(day: &str) -> Result<Weekday, CoreError> {
    day.trim()
        .parse::<Weekday>()
        .map_err(|_| CoreError::Validation(format!("Unknown weekday '{day}'")))
}

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| CoreError::Validation(format!("{field} must be HH:MM, got '{value}'")))
}

fn parse_interval(hours: &DayHours) -> Result<Interval, CoreError> {
    Ok(Interval {
        day: parse_day(&hours.day)?,
        open: parse_time(&hours.open, "open")?,
        close: parse_time(&hours.close, "close")?,
    })
}

/// Check that every row names a known weekday once and uses `HH:MM` times.
pub fn validate_hours(hours: &[DayHours]) -> Result<(), CoreError> {
    let mut seen: Vec<Weekday> = Vec::with_capacity(hours.len());
    for row in hours {
        let interval = parse_interval(row)?;
        if seen.contains(&interval.day) {
            return Err(CoreError::Validation(format!(
                "Weekday '{}' is listed more than once",
                row.day
            )));
        }
        seen.push(interval.day);
    }
    Ok(())
}

pub fn validate_utc_offset(minutes: i32) -> Result<(), CoreError> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(CoreError::Validation(format!(
            "utc_offset_minutes must be within +/-{MAX_UTC_OFFSET_MINUTES}"
        )));
    }
    Ok(())
}

/// Whether the restaurant is open at the given local wall-clock time.
///
/// Rows that fail to parse are skipped; [`validate_hours`] rejects them at
/// write time.
pub fn is_open_at(hours: &[DayHours], local: NaiveDateTime) -> bool {
    if hours.is_empty() {
        return true;
    }

    let today = local.weekday();
    let yesterday = today.pred();
    let now = local.time();

    hours
        .iter()
        .filter(|row| !row.closed)
        .filter_map(|row| parse_interval(row).ok())
        .any(|interval| {
            if interval.day == today {
                if interval.overnight() {
                    now >= interval.open
                } else {
                    now >= interval.open && now < interval.close
                }
            } else if interval.day == yesterday && interval.overnight() {
                now < interval.close
            } else {
                false
            }
        })
}

/// Evaluate [`is_open_at`] for an instant, using a fixed UTC offset.
pub fn is_open(hours: &[DayHours], utc_offset_minutes: i32, at: DateTime<Utc>) -> bool {
    let local = match FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)) {
        Some(offset) => at.with_timezone(&offset).naive_local(),
        None => at.naive_utc(),
    };
    is_open_at(hours, local)
}
