// src/schedule/request.rs

//! Create and update requests accepted by the schedule mutator.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{ProjectId, TaskId, TeamId, UserId};
use crate::types::{Priority, TaskStatus};

/// Input for [`super::ScheduleMutator::create_task`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// Defaults to `todo`. `done` goes through the completion gate.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

impl NewTask {
    pub fn new(project_id: impl Into<ProjectId>, title: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for [`super::ScheduleMutator::update_task`].
///
/// `None` leaves a field untouched. For `assignee_id` and `team_id` the
/// inner `None` clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee_id: Option<Option<UserId>>,
    #[serde(default)]
    pub team_id: Option<Option<TeamId>>,
    /// Replaces the dependency set and re-applies the dependency floor.
    #[serde(default)]
    pub dependencies: Option<Vec<TaskId>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

impl TaskPatch {
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = Some(deps.into_iter().collect());
        self
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn duration(mut self, days: u32) -> Self {
        self.duration_days = Some(days);
        self
    }
}
