// src/schedule/mutator.rs

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::dag::{DateResolver, DependencyGraph, ResolutionFrame};
use crate::dates::day_after;
use crate::errors::{Result, TaskgateError};
use crate::gate::CompletionGate;
use crate::model::{AuditAction, AuditRecord, Project, Task, TaskId, TeamId};
use crate::schedule::request::{NewTask, TaskPatch};
use crate::schedule::stored_dates::{DateChange, StoredDates};
use crate::store::{Precondition, Store, WriteBatch};

/// Applies create/update requests to task rows.
///
/// Every call validates first and then writes a single [`WriteBatch`], so a
/// failed call leaves the store untouched. The batch carries the row it was
/// computed from, and `Conflict` is returned if that row changed meanwhile. Dependents are never rewritten
/// here; they pick up date changes through read-time resolution or when they
/// are saved themselves.
#[derive(Debug)]
pub struct ScheduleMutator<'s, S: ?Sized> {
    store: &'s S,
    today: NaiveDate,
}

impl<'s, S: Store + ?Sized> ScheduleMutator<'s, S> {
    pub fn new(store: &'s S, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn create_task(&self, actor_id: &str, input: NewTask) -> Result<Task> {
        if input.title.trim().is_empty() {
            return Err(TaskgateError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let project = self.load_project(&input.project_id)?;
        self.check_team(&project, input.team_id.as_ref())?;

        let mut dates = StoredDates::default();
        dates.apply(DateChange {
            start: input.start_date,
            end: input.end_date,
            due: input.due_date,
            duration: input.duration_days,
        })?;

        let dependencies = dedup(&input.dependencies);
        if !dependencies.is_empty() {
            let deps = self.load_dependencies(&project, None, &dependencies)?;
            if let Some(floor) = self.dependency_floor(&project, &deps)? {
                dates.apply_floor(floor)?;
            }
        }

        let mut task = Task {
            id: self.store.next_task_id()?,
            project_id: project.id.clone(),
            team_id: input.team_id,
            assignee_id: input.assignee_id,
            title: input.title,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            dependencies,
            start_date: None,
            end_date: None,
            due_date: None,
            duration_days: None,
            deleted_at: None,
        };
        dates.write_to(&mut task);

        let mut batch = WriteBatch::default();
        if task.status.is_done() {
            let seen = CompletionGate::new(self.store).ensure_completable(&task)?;
            batch.preconditions.push(seen);
        }

        batch.tasks.push(task.clone());
        self.store.commit(batch)?;

        info!(task = task.id, actor = actor_id, project = %task.project_id, "task created");
        Ok(task)
    }

    pub fn update_task(&self, actor_id: &str, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let existing = self.load_task(id)?;
        if existing.is_deleted() {
            return Err(TaskgateError::Validation(format!(
                "task {id} is deleted; restore it before editing"
            )));
        }
        let project = self.load_project(&existing.project_id)?;
        let mut task = existing.clone();

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(TaskgateError::Validation(
                    "task title must not be empty".to_string(),
                ));
            }
            task.title = title;
        }
        if let Some(team_id) = patch.team_id {
            self.check_team(&project, team_id.as_ref())?;
            task.team_id = team_id;
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }

        let mut dates = StoredDates::from(&task);
        dates.apply(DateChange {
            start: patch.start_date,
            end: patch.end_date,
            due: patch.due_date,
            duration: patch.duration_days,
        })?;

        if let Some(requested) = patch.dependencies {
            let dependencies = dedup(&requested);
            let deps = self.load_dependencies(&project, Some(id), &dependencies)?;
            self.check_acyclic(&project, id, &dependencies)?;
            if let Some(floor) = self.dependency_floor(&project, &deps)? {
                dates.apply_floor(floor)?;
            }
            task.dependencies = dependencies;
        }
        dates.write_to(&mut task);

        let mut batch = WriteBatch::default();
        if let Some(status) = patch.status {
            if status != existing.status {
                if status.is_done() {
                    let seen = CompletionGate::new(self.store).ensure_completable(&task)?;
                    batch.preconditions.push(seen);
                }
                task.status = status;
                batch.audit.push(AuditRecord {
                    actor_id: actor_id.to_string(),
                    task_id: id,
                    action: AuditAction::StatusChanged,
                    from_status: existing.status,
                    to_status: status,
                    at: Utc::now(),
                });
            }
        }

        batch.tasks.push(task.clone());
        batch.preconditions.push(Precondition::TaskUnchanged(existing));
        self.store.commit(batch)?;

        info!(task = id, actor = actor_id, status = %task.status, "task updated");
        Ok(task)
    }

    /// Mark a task deleted. Deleting an already deleted task is a no-op.
    pub fn soft_delete_task(&self, actor_id: &str, id: TaskId) -> Result<Task> {
        let prior = self.load_task(id)?;
        if prior.is_deleted() {
            return Ok(prior);
        }
        let now = Utc::now();
        let mut task = prior.clone();
        task.deleted_at = Some(now);
        self.commit_with_audit(actor_id, prior, task, AuditAction::SoftDeleted, now)
    }

    /// Undo a soft delete. Restoring a live task is a no-op.
    pub fn restore_task(&self, actor_id: &str, id: TaskId) -> Result<Task> {
        let prior = self.load_task(id)?;
        if !prior.is_deleted() {
            return Ok(prior);
        }
        let mut task = prior.clone();
        task.deleted_at = None;
        self.commit_with_audit(actor_id, prior, task, AuditAction::Restored, Utc::now())
    }

    fn commit_with_audit(
        &self,
        actor_id: &str,
        prior: Task,
        task: Task,
        action: AuditAction,
        at: DateTime<Utc>,
    ) -> Result<Task> {
        let record = AuditRecord {
            actor_id: actor_id.to_string(),
            task_id: task.id,
            action,
            from_status: task.status,
            to_status: task.status,
            at,
        };
        self.store.commit(WriteBatch {
            tasks: vec![task.clone()],
            feedback: None,
            audit: vec![record],
            preconditions: vec![Precondition::TaskUnchanged(prior)],
        })?;
        info!(task = task.id, actor = actor_id, ?action, "task visibility changed");
        Ok(task)
    }

    /// Load and check the dependency rows referenced by a request.
    fn load_dependencies(
        &self,
        project: &Project,
        task_id: Option<TaskId>,
        ids: &[TaskId],
    ) -> Result<Vec<Task>> {
        let mut deps = Vec::with_capacity(ids.len());
        for dep_id in ids {
            if Some(*dep_id) == task_id {
                return Err(TaskgateError::CycleDetected(*dep_id));
            }
            let dep = self.load_task(*dep_id)?;
            if dep.project_id != project.id {
                return Err(TaskgateError::Validation(format!(
                    "dependency {dep_id} belongs to project '{}', not '{}'",
                    dep.project_id, project.id
                )));
            }
            deps.push(dep);
        }
        Ok(deps)
    }

    /// Reject a dependency edit that would close a cycle in the project.
    fn check_acyclic(&self, project: &Project, id: TaskId, deps: &[TaskId]) -> Result<()> {
        let tasks = self.store.tasks_in_project(&project.id, true)?;
        let mut graph = DependencyGraph::from_tasks(tasks.iter());
        graph.set_dependencies(id, deps);
        graph.check_acyclic()
    }

    /// Earliest start permitted by `deps`: the day after their latest end.
    ///
    /// Uses each dependency's stored end date, then its due date, and only
    /// then its resolved end (over the project's live tasks). The result can
    /// differ from what read-time resolution shows for the same dependency.
    /// Soft-deleted dependencies keep their edge but set no floor.
    fn dependency_floor(&self, project: &Project, deps: &[Task]) -> Result<Option<NaiveDate>> {
        let live: Vec<&Task> = deps.iter().filter(|d| !d.is_deleted()).collect();
        let fallback_frame = if live.iter().any(|d| d.stored_end().is_none()) {
            Some(ResolutionFrame::new(
                self.store.tasks_in_project(&project.id, false)?,
            ))
        } else {
            None
        };
        let mut resolver = fallback_frame
            .as_ref()
            .map(|frame| DateResolver::new(frame, self.today));

        let mut max_end: Option<NaiveDate> = None;
        for dep in live {
            let end = match (dep.stored_end(), resolver.as_mut()) {
                (Some(end), _) => end,
                (None, Some(resolver)) => resolver.resolve(dep.id)?.end,
                (None, None) => continue,
            };
            max_end = Some(max_end.map_or(end, |current| current.max(end)));
        }

        let floor = max_end.map(day_after).transpose()?;
        debug!(?max_end, ?floor, "computed dependency floor");
        Ok(floor)
    }

    fn check_team(&self, project: &Project, team_id: Option<&TeamId>) -> Result<()> {
        let Some(team_id) = team_id else {
            return Ok(());
        };
        let team = self
            .store
            .team(team_id)?
            .ok_or_else(|| TaskgateError::NotFound(format!("team {team_id}")))?;
        if team.project_id != project.id {
            return Err(TaskgateError::Validation(format!(
                "team '{team_id}' belongs to project '{}', not '{}'",
                team.project_id, project.id
            )));
        }
        Ok(())
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

/// Drop repeated ids, keeping first occurrence order.
fn dedup(ids: &[TaskId]) -> Vec<TaskId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
