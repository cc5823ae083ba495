// src/dates.rs

//! Calendar-date arithmetic shared by the resolver and the mutator.
//!
//! All scheduling happens on whole days; there is no time-of-day.

use chrono::{Days, NaiveDate};

use crate::errors::{Result, TaskgateError};

/// `date + days`, failing instead of panicking at the edge of the calendar.
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| TaskgateError::Validation(format!("date {date} + {days} days out of range")))
}

/// End date of a span of `duration` days starting on `start` (inclusive).
///
/// A zero duration is treated as one day.
pub fn end_from_duration(start: NaiveDate, duration: u32) -> Result<NaiveDate> {
    add_days(start, u64::from(duration.max(1)) - 1)
}

/// Inclusive number of days from `start` to `end`, never less than 1.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days() + 1;
    u32::try_from(days.max(1)).unwrap_or(u32::MAX)
}

/// Day after `date`: the earliest start permitted after a dependency ends.
pub fn day_after(date: NaiveDate) -> Result<NaiveDate> {
    add_days(date, 1)
}
