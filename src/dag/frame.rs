// src/dag/frame.rs

//! Resolution frames: the bounded task set a resolution runs over.

use std::collections::BTreeMap;

use tracing::trace;

use crate::errors::{Result, TaskgateError};
use crate::model::{Task, TaskId};

/// Fixed snapshot of tasks (typically the live tasks of one team).
///
/// Dependencies pointing outside the frame are ignored by every
/// computation over it.
#[derive(Debug, Clone, Default)]
pub struct ResolutionFrame {
    tasks: BTreeMap<TaskId, Task>,
}

impl ResolutionFrame {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Tasks in ascending id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A task is blocked iff a direct in-frame dependency is not `done`.
    ///
    /// Uses raw status only; resolved dates play no part.
    pub fn is_blocked(&self, id: TaskId) -> Result<bool> {
        let task = self.get(id).ok_or_else(|| TaskgateError::task_not_found(id))?;

        for dep_id in &task.dependencies {
            match self.get(*dep_id) {
                Some(dep) if !dep.status.is_done() => {
                    trace!(task = id, dep = dep_id, status = %dep.status, "blocked by dependency");
                    return Ok(true);
                }
                Some(_) => {}
                None => {
                    // Outside the frame; does not block.
                }
            }
        }

        Ok(false)
    }
}
