// src/model.rs

//! Records exchanged with the stores.
//!
//! These mirror what the persistence layer keeps: tasks with their *stored*
//! dates, immutable feedback entries, project policy, teams and milestones.
//! Effective (resolved) dates are never stored here; see [`crate::dag`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Priority, TaskStatus};

/// Task identifier, assigned by the store on creation.
pub type TaskId = u64;
pub type ProjectId = String;
pub type TeamId = String;
pub type ClassId = String;
/// Caller identity threaded through every mutating call.
pub type UserId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub team_id: Option<TeamId>,
    pub assignee_id: Option<UserId>,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Direct dependencies (ids of tasks in the same project).
    pub dependencies: Vec<TaskId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    /// Soft-delete marker; tasks are never removed from the store.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Stored end used by the write-time floor: `end_date`, else `due_date`.
    pub fn stored_end(&self) -> Option<NaiveDate> {
        self.end_date.or(self.due_date)
    }
}

/// Effective start/end of a task after dependency propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// One-day span, used as the default for tasks without dates.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }
}

/// A critique submission. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Insertion sequence; the highest id for a task is the latest entry.
    pub id: u64,
    pub task_id: TaskId,
    pub author_id: UserId,
    pub warm_feedback: String,
    pub cool_feedback: String,
    pub requires_revision: bool,
    pub checklist_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub class_id: ClassId,
    /// When true every task of the project goes through the completion gate.
    pub require_critique: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum MilestoneScope {
    Project(ProjectId),
    Class(ClassId),
}

/// Date-stamped marker shown on the timeline; independent of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    pub due_date: NaiveDate,
    pub scope: MilestoneScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Status forced back to `doing` by a revision request.
    StatusForced,
    StatusChanged,
    SoftDeleted,
    Restored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor_id: UserId,
    pub task_id: TaskId,
    pub action: AuditAction,
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    pub at: DateTime<Utc>,
}
