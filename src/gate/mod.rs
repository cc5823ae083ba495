// src/gate/mod.rs

//! Completion gate: decides whether a task may carry status `done`.
//!
//! Completion is a two-phase protocol when a project requires critique:
//!
//! 1. a `done` transition is proposed and refused (`GateRefused`),
//! 2. a reviewer submits feedback,
//! 3. the `done` transition is retried and succeeds if the latest feedback
//!    does not ask for a revision.
//!
//! The gate state is never stored on the task. It is derived from the most
//! recent [`FeedbackEntry`] so the full critique history stays intact.

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{Result, TaskgateError};
use crate::model::{AuditAction, AuditRecord, FeedbackEntry, Project, Task, TaskId};
use crate::store::{Precondition, Store, WriteBatch};
use crate::types::TaskStatus;

pub mod feedback;

pub use feedback::FeedbackInput;

/// Gate rule for one task given its project policy and latest feedback.
pub fn completable_under(project: &Project, latest: Option<&FeedbackEntry>) -> bool {
    if !project.require_critique {
        return true;
    }
    match latest {
        Some(entry) => !entry.requires_revision,
        None => false,
    }
}

#[derive(Debug)]
pub struct CompletionGate<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> CompletionGate<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn is_completable(&self, task_id: TaskId) -> Result<bool> {
        let task = self.load_task(task_id)?;
        self.is_completable_task(&task)
    }

    pub fn is_completable_task(&self, task: &Task) -> Result<bool> {
        let project = self.load_project(&task.project_id)?;
        if !project.require_critique {
            return Ok(true);
        }
        let latest = self.store.latest_feedback(task.id)?;
        Ok(completable_under(&project, latest.as_ref()))
    }

    /// `GateRefused` unless `task` may be moved to `done` right now.
    ///
    /// On success returns the feedback state the decision was based on; the
    /// caller commits it alongside the `done` row so a critique landing in
    /// between fails the write.
    pub fn ensure_completable(&self, task: &Task) -> Result<Precondition> {
        let project = self.load_project(&task.project_id)?;
        let latest = self.store.latest_feedback(task.id)?;
        if completable_under(&project, latest.as_ref()) {
            Ok(Precondition::LatestFeedback {
                task_id: task.id,
                id: latest.map(|f| f.id),
            })
        } else {
            warn!(task = task.id, "completion refused; critique required");
            Err(TaskgateError::GateRefused(task.id))
        }
    }

    /// Record a critique for `task_id`.
    ///
    /// When the critique requires a revision the task is forced back to
    /// `doing` (whatever its current status) and a `StatusForced` audit
    /// record is written in the same commit. That commit fails with
    /// `Conflict` if the row changed after it was read.
    pub fn submit_feedback(
        &self,
        author_id: &str,
        task_id: TaskId,
        input: FeedbackInput,
    ) -> Result<FeedbackEntry> {
        input.validate()?;
        let mut task = self.load_task(task_id)?;

        let now = Utc::now();
        let entry = FeedbackEntry {
            id: self.store.next_feedback_id()?,
            task_id,
            author_id: author_id.to_string(),
            warm_feedback: input.warm_feedback,
            cool_feedback: input.cool_feedback,
            requires_revision: input.requires_revision,
            checklist_confirmed: input.checklist_confirmed,
            created_at: now,
        };

        let mut batch = WriteBatch {
            feedback: Some(entry.clone()),
            ..WriteBatch::default()
        };

        if entry.requires_revision {
            batch.preconditions.push(Precondition::TaskUnchanged(task.clone()));
            let from = task.status;
            task.status = TaskStatus::Doing;
            batch.audit.push(AuditRecord {
                actor_id: author_id.to_string(),
                task_id,
                action: AuditAction::StatusForced,
                from_status: from,
                to_status: TaskStatus::Doing,
                at: now,
            });
            batch.tasks.push(task);
            info!(task = task_id, author = author_id, from = %from, "revision requested; status forced to doing");
        } else {
            info!(task = task_id, author = author_id, "critique approved");
        }

        self.store.commit(batch)?;
        Ok(entry)
    }

    pub fn feedback_history(&self, task_id: TaskId) -> Result<Vec<FeedbackEntry>> {
        self.load_task(task_id)?;
        self.store.feedback_for(task_id)
    }

    fn load_task(&self, id: TaskId) -> Result<Task> {
        self.store
            .task(id)?
            .ok_or_else(|| TaskgateError::task_not_found(id))
    }

    fn load_project(&self, id: &str) -> Result<Project> {
        self.store
            .project(id)?
            .ok_or_else(|| TaskgateError::NotFound(format!("project {id}")))
    }
}
