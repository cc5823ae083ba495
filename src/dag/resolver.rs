// src/dag/resolver.rs

//! Read-time effective date resolution.
//!
//! A task's effective start is its stored start (or today), pushed forward to
//! the latest effective end among its in-frame dependencies. Note that this
//! read-time rule lets a task start on the *same day* its dependency ends,
//! while the write-time floor in [`crate::schedule`] requires the day after.
//! Both rules are relied upon and must not be unified.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::dag::frame::ResolutionFrame;
use crate::dates::end_from_duration;
use crate::errors::{Result, TaskgateError};
use crate::model::{DateSpan, Task, TaskId};

/// Memoizing resolver over one [`ResolutionFrame`].
///
/// Keep one instance for a whole read (e.g. a timeline) so diamond-shaped
/// dependency graphs are evaluated once per task.
#[derive(Debug)]
pub struct DateResolver<'f> {
    frame: &'f ResolutionFrame,
    today: NaiveDate,
    memo: HashMap<TaskId, DateSpan>,
    /// Tasks on the current walk path.
    visiting: HashSet<TaskId>,
}

impl<'f> DateResolver<'f> {
    pub fn new(frame: &'f ResolutionFrame, today: NaiveDate) -> Self {
        Self {
            frame,
            today,
            memo: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    /// Effective `{start, end}` of `id`.
    ///
    /// Fails with `NotFound` if `id` is not in the frame and with
    /// `CycleDetected` if resolution re-enters a task on its own path. The
    /// resolver stays usable after an error.
    pub fn resolve(&mut self, id: TaskId) -> Result<DateSpan> {
        let result = self.resolve_inner(id);
        if result.is_err() {
            self.visiting.clear();
        }
        result
    }

    /// Depth-first walk with an explicit work stack, so chain length is
    /// bounded by the heap rather than the thread stack.
    fn resolve_inner(&mut self, id: TaskId) -> Result<DateSpan> {
        if let Some(span) = self.memo.get(&id) {
            return Ok(*span);
        }

        let frame = self.frame;
        if !frame.contains(id) {
            return Err(TaskgateError::task_not_found(id));
        }

        // (task, dependencies already pushed)
        let mut stack: Vec<(TaskId, bool)> = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if self.memo.contains_key(&current) {
                continue;
            }
            let task = frame
                .get(current)
                .ok_or_else(|| TaskgateError::task_not_found(current))?;

            if !expanded {
                if !self.visiting.insert(current) {
                    debug!(task = current, "dependency cycle reached during resolution");
                    return Err(TaskgateError::CycleDetected(current));
                }
                stack.push((current, true));
                for dep in task.dependencies.iter().rev() {
                    if !frame.contains(*dep) {
                        trace!(task = current, dep, "dependency outside frame; ignored");
                        continue;
                    }
                    if !self.memo.contains_key(dep) {
                        stack.push((*dep, false));
                    }
                }
                continue;
            }

            // Every in-frame dependency is memoized by now.
            let max_dep_end = task
                .dependencies
                .iter()
                .filter_map(|dep| self.memo.get(dep))
                .map(|span| span.end)
                .max();

            let span = self.span_for(task, max_dep_end)?;
            trace!(task = current, start = %span.start, end = %span.end, "resolved effective dates");

            self.visiting.remove(&current);
            self.memo.insert(current, span);
        }

        self.memo
            .get(&id)
            .copied()
            .ok_or_else(|| TaskgateError::task_not_found(id))
    }

    fn span_for(&self, task: &Task, max_dep_end: Option<NaiveDate>) -> Result<DateSpan> {
        let baseline = task.start_date.unwrap_or(self.today);
        let start = match max_dep_end {
            Some(dep_end) if dep_end > baseline => dep_end,
            _ => baseline,
        };

        let end = match task.end_date.or(task.due_date) {
            Some(end) => end,
            None => end_from_duration(start, task.duration_days.unwrap_or(1))?,
        };

        Ok(DateSpan {
            start,
            end: end.max(start),
        })
    }
}

/// One-shot resolution of a single task.
pub fn resolve_dates(frame: &ResolutionFrame, id: TaskId, today: NaiveDate) -> Result<DateSpan> {
    DateResolver::new(frame, today).resolve(id)
}
