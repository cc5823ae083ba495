// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use tracing::debug;

use super::{FeedbackStore, Precondition, ProjectStore, Store, TaskStore, WriteBatch};
use crate::config::Snapshot;
use crate::errors::{Result, TaskgateError};
use crate::model::{
    AuditRecord, FeedbackEntry, Milestone, MilestoneScope, Project, Task, TaskId, Team,
};

#[derive(Debug, Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    feedback: Vec<FeedbackEntry>,
    projects: HashMap<String, Project>,
    teams: HashMap<String, Team>,
    milestones: Vec<Milestone>,
    audit: Vec<AuditRecord>,
    last_task_id: TaskId,
    last_feedback_id: u64,
}

impl Inner {
    fn holds(&self, precondition: &Precondition) -> bool {
        match precondition {
            Precondition::TaskUnchanged(expected) => self.tasks.get(&expected.id) == Some(expected),
            Precondition::LatestFeedback { task_id, id } => {
                let latest = self
                    .feedback
                    .iter()
                    .filter(|f| f.task_id == *task_id)
                    .map(|f| f.id)
                    .max();
                latest == *id
            }
        }
    }
}

/// Store kept entirely in memory behind one lock.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding every row of a validated snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let store = Self::new();
        for project in snapshot.projects() {
            store.insert_project(project.clone())?;
        }
        for team in snapshot.teams() {
            store.insert_team(team.clone())?;
        }
        for task in snapshot.tasks() {
            store.insert_task(task.clone())?;
        }
        for entry in snapshot.feedback() {
            store.insert_feedback(entry.clone())?;
        }
        for milestone in snapshot.milestones() {
            store.insert_milestone(milestone.clone())?;
        }
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| TaskgateError::Other(anyhow!("in-memory store lock poisoned")))
    }

    pub fn insert_project(&self, project: Project) -> Result<()> {
        let mut inner = self.lock()?;
        inner.projects.insert(project.id.clone(), project);
        Ok(())
    }

    pub fn insert_team(&self, team: Team) -> Result<()> {
        let mut inner = self.lock()?;
        inner.teams.insert(team.id.clone(), team);
        Ok(())
    }

    pub fn insert_milestone(&self, milestone: Milestone) -> Result<()> {
        let mut inner = self.lock()?;
        inner.milestones.push(milestone);
        Ok(())
    }

    /// Seed a task row with its own id (e.g. from a snapshot).
    ///
    /// Later ids handed out by [`Store::next_task_id`] continue after the
    /// highest seeded id.
    pub fn insert_task(&self, task: Task) -> Result<()> {
        let mut inner = self.lock()?;
        inner.last_task_id = inner.last_task_id.max(task.id);
        inner.tasks.insert(task.id, task);
        Ok(())
    }

    /// Seed a feedback entry, keeping its id as the insertion sequence.
    pub fn insert_feedback(&self, entry: FeedbackEntry) -> Result<()> {
        let mut inner = self.lock()?;
        inner.last_feedback_id = inner.last_feedback_id.max(entry.id);
        inner.feedback.push(entry);
        Ok(())
    }

    /// Overwrite a task row without going through the engine.
    ///
    /// Stands in for an external writer (another service, a concurrent
    /// request) changing the row underneath the engine.
    pub fn overwrite_task(&self, task: Task) -> Result<()> {
        self.insert_task(task)
    }

    pub fn task_count(&self) -> Result<usize> {
        Ok(self.lock()?.tasks.len())
    }
}

impl TaskStore for InMemoryStore {
    fn task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    fn tasks_in_project(&self, project_id: &str, include_deleted: bool) -> Result<Vec<Task>> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .filter(|t| include_deleted || !t.is_deleted())
            .cloned()
            .collect())
    }

    fn tasks_in_team(&self, team_id: &str, include_deleted: bool) -> Result<Vec<Task>> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.team_id.as_deref() == Some(team_id))
            .filter(|t| include_deleted || !t.is_deleted())
            .cloned()
            .collect())
    }
}

impl FeedbackStore for InMemoryStore {
    fn latest_feedback(&self, task_id: TaskId) -> Result<Option<FeedbackEntry>> {
        let inner = self.lock()?;
        Ok(inner
            .feedback
            .iter()
            .filter(|f| f.task_id == task_id)
            .max_by_key(|f| f.id)
            .cloned())
    }

    fn feedback_for(&self, task_id: TaskId) -> Result<Vec<FeedbackEntry>> {
        let inner = self.lock()?;
        let mut entries: Vec<FeedbackEntry> = inner
            .feedback
            .iter()
            .filter(|f| f.task_id == task_id)
            .cloned()
            .collect();
        entries.sort_by_key(|f| f.id);
        Ok(entries)
    }
}

impl ProjectStore for InMemoryStore {
    fn project(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.lock()?.projects.get(id).cloned())
    }

    fn team(&self, id: &str) -> Result<Option<Team>> {
        Ok(self.lock()?.teams.get(id).cloned())
    }

    fn milestones(&self, scope: &MilestoneScope) -> Result<Vec<Milestone>> {
        let inner = self.lock()?;
        Ok(inner
            .milestones
            .iter()
            .filter(|m| &m.scope == scope)
            .cloned()
            .collect())
    }
}

impl Store for InMemoryStore {
    fn next_task_id(&self) -> Result<TaskId> {
        let mut inner = self.lock()?;
        inner.last_task_id += 1;
        Ok(inner.last_task_id)
    }

    fn next_feedback_id(&self) -> Result<u64> {
        let mut inner = self.lock()?;
        inner.last_feedback_id += 1;
        Ok(inner.last_feedback_id)
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        // Single lock for the whole batch: readers see all of it or none.
        let mut inner = self.lock()?;

        for precondition in batch.preconditions.iter() {
            if !inner.holds(precondition) {
                debug!(task = precondition.task_id(), ?precondition, "commit precondition failed");
                return Err(TaskgateError::Conflict(precondition.task_id()));
            }
        }
        if batch.is_empty() {
            return Ok(());
        }

        debug!(
            tasks = batch.tasks.len(),
            feedback = batch.feedback.is_some(),
            audit = batch.audit.len(),
            "committing write batch"
        );

        for task in batch.tasks {
            inner.last_task_id = inner.last_task_id.max(task.id);
            inner.tasks.insert(task.id, task);
        }
        if let Some(entry) = batch.feedback {
            inner.last_feedback_id = inner.last_feedback_id.max(entry.id);
            inner.feedback.push(entry);
        }
        inner.audit.extend(batch.audit);

        Ok(())
    }

    fn audit_trail(&self, task_id: TaskId) -> Result<Vec<AuditRecord>> {
        let inner = self.lock()?;
        Ok(inner
            .audit
            .iter()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect())
    }
}
