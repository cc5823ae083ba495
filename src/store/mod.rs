// src/store/mod.rs

//! Persistence seams.
//!
//! The engine never talks to a database directly. It reads through the
//! [`TaskStore`], [`FeedbackStore`] and [`ProjectStore`] traits and writes
//! exclusively through [`Store::commit`], which must apply a whole
//! [`WriteBatch`] or nothing.
//!
//! [`memory::InMemoryStore`] is the reference implementation used by the CLI
//! and the tests.

use std::fmt::Debug;

use crate::errors::Result;
use crate::model::{
    AuditRecord, FeedbackEntry, Milestone, MilestoneScope, Project, Task, TaskId, Team,
};

pub mod memory;

pub use memory::InMemoryStore;

/// Read access to task rows.
pub trait TaskStore: Send + Sync + Debug {
    fn task(&self, id: TaskId) -> Result<Option<Task>>;

    /// Tasks of a project ordered by id.
    fn tasks_in_project(&self, project_id: &str, include_deleted: bool) -> Result<Vec<Task>>;

    /// Tasks of a team ordered by id.
    fn tasks_in_team(&self, team_id: &str, include_deleted: bool) -> Result<Vec<Task>>;
}

/// Read access to critique submissions.
pub trait FeedbackStore: Send + Sync + Debug {
    /// Most recent entry by insertion order, if any.
    fn latest_feedback(&self, task_id: TaskId) -> Result<Option<FeedbackEntry>>;

    /// All entries for a task in insertion order.
    fn feedback_for(&self, task_id: TaskId) -> Result<Vec<FeedbackEntry>>;
}

/// Read access to projects, teams and milestones.
pub trait ProjectStore: Send + Sync + Debug {
    fn project(&self, id: &str) -> Result<Option<Project>>;
    fn team(&self, id: &str) -> Result<Option<Team>>;
    fn milestones(&self, scope: &MilestoneScope) -> Result<Vec<Milestone>>;
}

/// State a batch was computed against, re-checked by [`Store::commit`]
/// under the same lock as the writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The stored row still equals this one.
    TaskUnchanged(Task),
    /// The task's latest feedback entry is still `id` (`None`: no feedback).
    LatestFeedback { task_id: TaskId, id: Option<u64> },
}

impl Precondition {
    pub fn task_id(&self) -> TaskId {
        match self {
            Precondition::TaskUnchanged(task) => task.id,
            Precondition::LatestFeedback { task_id, .. } => *task_id,
        }
    }
}

/// Everything one engine call wants to persist.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// Full task rows to upsert.
    pub tasks: Vec<Task>,
    pub feedback: Option<FeedbackEntry>,
    pub audit: Vec<AuditRecord>,
    pub preconditions: Vec<Precondition>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.feedback.is_none() && self.audit.is_empty()
    }
}

/// Full store used by the engine.
pub trait Store: TaskStore + FeedbackStore + ProjectStore {
    fn next_task_id(&self) -> Result<TaskId>;
    fn next_feedback_id(&self) -> Result<u64>;

    /// Apply the batch atomically.
    ///
    /// Fails with `Conflict` and writes nothing when any precondition no
    /// longer holds. Rows are upserted whole, so callers that read a row
    /// before writing it must guard it with [`Precondition::TaskUnchanged`].
    fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Audit records for a task in the order they were written.
    fn audit_trail(&self, task_id: TaskId) -> Result<Vec<AuditRecord>>;
}
