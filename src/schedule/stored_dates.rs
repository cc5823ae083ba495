// src/schedule/stored_dates.rs

//! Keeps a task's stored start, end and duration consistent on write.

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{end_from_duration, inclusive_days};
use crate::errors::{Result, TaskgateError};
use crate::model::Task;

/// Date fields supplied by a single create/update call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateChange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub duration: Option<u32>,
}

/// The stored (not resolved) date fields of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredDates {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub duration: Option<u32>,
}

impl From<&Task> for StoredDates {
    fn from(task: &Task) -> Self {
        Self {
            start: task.start_date,
            end: task.end_date,
            due: task.due_date,
            duration: task.duration_days,
        }
    }
}

impl StoredDates {
    pub fn write_to(&self, task: &mut Task) {
        task.start_date = self.start;
        task.end_date = self.end;
        task.due_date = self.due;
        task.duration_days = self.duration;
    }

    /// Merge `change` into the current dates.
    ///
    /// Rules:
    /// - an explicit end wins over an explicit duration; the duration is
    ///   re-derived from start and end,
    /// - a duration without an end derives the end,
    /// - a start moved on its own keeps an established duration by
    ///   re-deriving the end.
    pub fn apply(&mut self, change: DateChange) -> Result<()> {
        if change.duration == Some(0) {
            return Err(TaskgateError::Validation(
                "duration_days must be at least 1".to_string(),
            ));
        }

        if let Some(due) = change.due {
            self.due = Some(due);
        }
        if let Some(start) = change.start {
            self.start = Some(start);
        }

        match (change.end, change.duration) {
            (Some(end), duration) => {
                if let Some(start) = self.start {
                    if end < start {
                        return Err(TaskgateError::Validation(format!(
                            "end date {end} is before start date {start}"
                        )));
                    }
                    self.duration = Some(inclusive_days(start, end));
                } else if duration.is_some() {
                    self.duration = duration;
                }
                self.end = Some(end);
            }
            (None, Some(duration)) => {
                self.duration = Some(duration);
                if let Some(start) = self.start {
                    self.end = Some(end_from_duration(start, duration)?);
                }
            }
            (None, None) => {
                if change.start.is_some() {
                    self.rederive_after_start_move()?;
                }
            }
        }

        Ok(())
    }

    fn rederive_after_start_move(&mut self) -> Result<()> {
        match (self.start, self.end, self.duration) {
            (Some(start), _, Some(duration)) => {
                self.end = Some(end_from_duration(start, duration)?);
            }
            (Some(start), Some(end), None) => {
                self.duration = Some(inclusive_days(start, end));
            }
            _ => {}
        }
        Ok(())
    }

    /// Push the start forward to `floor` if it is absent or earlier.
    ///
    /// With an established duration the end moves by the same amount.
    /// Without one only the start moves. Never moves a start earlier.
    pub fn apply_floor(&mut self, floor: NaiveDate) -> Result<bool> {
        if matches!(self.start, Some(start) if start >= floor) {
            return Ok(false);
        }

        debug!(previous = ?self.start, %floor, "start advanced to dependency floor");
        self.start = Some(floor);
        if let Some(duration) = self.duration {
            self.end = Some(end_from_duration(floor, duration)?);
        }
        Ok(true)
    }
}
