// src/board.rs

//! Client-side task board with optimistic updates.
//!
//! A drag-and-drop status change is applied to the local copy immediately,
//! then sent to the engine. If the engine rejects it (gate refusal,
//! validation failure, ...) the local copy is restored to exactly the status
//! and date fields it had before, rather than silently reloaded.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::errors::{Result, TaskgateError};
use crate::model::{Task, TaskId};
use crate::schedule::TaskPatch;
use crate::store::Store;
use crate::types::TaskStatus;

/// Fields an optimistic change may touch, captured for rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFields {
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
}

impl From<&Task> for TaskFields {
    fn from(task: &Task) -> Self {
        Self {
            status: task.status,
            start_date: task.start_date,
            end_date: task.end_date,
            due_date: task.due_date,
            duration_days: task.duration_days,
        }
    }
}

impl TaskFields {
    fn restore_into(&self, task: &mut Task) {
        task.status = self.status;
        task.start_date = self.start_date;
        task.end_date = self.end_date;
        task.due_date = self.due_date;
        task.duration_days = self.duration_days;
    }
}

/// A locally applied change awaiting the server's answer.
#[derive(Debug, Clone)]
#[must_use = "a pending change must be confirmed or rolled back"]
pub struct PendingChange {
    pub task_id: TaskId,
    prior: TaskFields,
}

#[derive(Debug, Clone, Default)]
pub struct OptimisticBoard {
    tasks: BTreeMap<TaskId, Task>,
}

impl OptimisticBoard {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.values().filter(|t| t.status == status).collect()
    }

    /// Apply the status and date fields of `patch` locally.
    pub fn begin_change(&mut self, id: TaskId, patch: &TaskPatch) -> Result<PendingChange> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| TaskgateError::task_not_found(id))?;
        let prior = TaskFields::from(&*task);

        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(start) = patch.start_date {
            task.start_date = Some(start);
        }
        if let Some(end) = patch.end_date {
            task.end_date = Some(end);
        }
        if let Some(due) = patch.due_date {
            task.due_date = Some(due);
        }
        if let Some(duration) = patch.duration_days {
            task.duration_days = Some(duration);
        }

        debug!(task = id, "optimistic change applied locally");
        Ok(PendingChange { task_id: id, prior })
    }

    /// Replace the local copy with the row the server accepted.
    pub fn confirm(&mut self, change: PendingChange, accepted: Task) {
        debug!(task = change.task_id, "optimistic change confirmed");
        self.tasks.insert(accepted.id, accepted);
    }

    /// Restore the fields captured when `change` began.
    pub fn rollback(&mut self, change: PendingChange) {
        if let Some(task) = self.tasks.get_mut(&change.task_id) {
            change.prior.restore_into(task);
            info!(task = change.task_id, status = %task.status, "optimistic change rolled back");
        }
    }

    /// Apply `patch` locally, send it, and confirm or roll back.
    pub fn submit<S: Store>(
        &mut self,
        engine: &Engine<S>,
        actor_id: &str,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task> {
        let change = self.begin_change(id, &patch)?;
        match engine.update_task(actor_id, id, patch) {
            Ok(task) => {
                self.confirm(change, task.clone());
                Ok(task)
            }
            Err(err) => {
                self.rollback(change);
                Err(err)
            }
        }
    }
}
