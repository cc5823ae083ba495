// src/config/model.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::engine::EngineConfig;
use crate::model::{FeedbackEntry, Milestone, Project, Task, TaskId, Team};
use crate::types::{Priority, TaskStatus};

/// Snapshot file as read from TOML, before validation.
///
/// ```toml
/// [engine]
/// today = "2024-01-10"
///
/// [project.p1]
/// class_id = "c1"
/// require_critique = true
///
/// [team.t1]
/// project_id = "p1"
///
/// [task.1]
/// project_id = "p1"
/// team_id = "t1"
/// title = "Research"
/// start_date = "2024-01-01"
/// duration_days = 3
///
/// [task.2]
/// project_id = "p1"
/// team_id = "t1"
/// title = "Draft"
/// dependencies = [1]
///
/// [[feedback]]
/// task_id = 1
/// author_id = "reviewer"
/// warm_feedback = "Solid sources"
/// checklist_confirmed = true
///
/// [[milestone]]
/// title = "Checkpoint 1"
/// due_date = "2024-01-15"
/// class_id = "c1"
/// ```
///
/// Dates are quoted `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Keys are project ids.
    #[serde(default)]
    pub project: BTreeMap<String, ProjectSection>,

    /// Keys are team ids.
    #[serde(default)]
    pub team: BTreeMap<String, TeamSection>,

    /// Keys are numeric task ids.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,

    /// Feedback entries in insertion order (last one per task is the latest).
    #[serde(default)]
    pub feedback: Vec<FeedbackSection>,

    #[serde(default)]
    pub milestone: Vec<MilestoneSection>,
}

/// `[project.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    pub class_id: String,
    #[serde(default)]
    pub require_critique: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// `[team.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamSection {
    pub project_id: String,
}

/// `[task.<id>]` section: a stored task row.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSection {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
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
    /// Soft-deleted rows are kept but excluded from scheduling.
    #[serde(default)]
    pub deleted: bool,
}

/// `[[feedback]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSection {
    pub task_id: TaskId,
    pub author_id: String,
    #[serde(default)]
    pub warm_feedback: String,
    #[serde(default)]
    pub cool_feedback: String,
    #[serde(default)]
    pub requires_revision: bool,
    #[serde(default)]
    pub checklist_confirmed: bool,
}

/// `[[milestone]]` entry; exactly one of `project_id` / `class_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneSection {
    pub title: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

/// Validated snapshot, ready to seed a store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    engine: EngineConfig,
    projects: Vec<Project>,
    teams: Vec<Team>,
    tasks: Vec<Task>,
    feedback: Vec<FeedbackEntry>,
    milestones: Vec<Milestone>,
}

impl Snapshot {
    /// Only used by validation, which guarantees the invariants.
    pub(crate) fn new_unchecked(
        engine: EngineConfig,
        projects: Vec<Project>,
        teams: Vec<Team>,
        tasks: Vec<Task>,
        feedback: Vec<FeedbackEntry>,
        milestones: Vec<Milestone>,
    ) -> Self {
        Self {
            engine,
            projects,
            teams,
            tasks,
            feedback,
            milestones,
        }
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }
}
