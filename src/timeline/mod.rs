// src/timeline/mod.rs

//! Read-only timeline for one team.
//!
//! Resolves every live task of the team with a single shared
//! [`DateResolver`], attaches blocked/completable flags and in-team
//! dependents, and merges project and class milestones. A task whose dates
//! cannot be resolved (for example because of a dependency cycle) is shown
//! as a one-day span starting today and flagged `degraded`; it never blanks
//! the rest of the timeline.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::{DateResolver, DependencyGraph, ResolutionFrame};
use crate::errors::{Result, TaskgateError};
use crate::gate::completable_under;
use crate::model::{
    DateSpan, Milestone, MilestoneScope, Project, ProjectId, Task, TaskId, TeamId,
};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineTask {
    #[serde(flatten)]
    pub task: Task,
    /// Effective start after dependency propagation.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub blocked: bool,
    pub completable: bool,
    /// Dates could not be resolved and were defaulted.
    pub degraded: bool,
    /// Live tasks of the same team that wait on this one, ascending.
    pub dependents: Vec<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub team_id: TeamId,
    pub project_id: ProjectId,
    pub bounds: Option<ProjectBounds>,
    /// Ordered by effective start, then end, then id.
    pub tasks: Vec<TimelineTask>,
    /// Project and class milestones, ascending by due date.
    pub milestones: Vec<Milestone>,
}

impl Timeline {
    pub fn task(&self, id: u64) -> Option<&TimelineTask> {
        self.tasks.iter().find(|t| t.task.id == id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug)]
pub struct TimelineAssembler<'s, S: ?Sized> {
    store: &'s S,
    today: NaiveDate,
}

impl<'s, S: Store + ?Sized> TimelineAssembler<'s, S> {
    pub fn new(store: &'s S, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn assemble(&self, team_id: &str) -> Result<Timeline> {
        let team = self
            .store
            .team(team_id)?
            .ok_or_else(|| TaskgateError::NotFound(format!("team {team_id}")))?;
        let project = self
            .store
            .project(&team.project_id)?
            .ok_or_else(|| TaskgateError::NotFound(format!("project {}", team.project_id)))?;

        let frame = ResolutionFrame::new(self.store.tasks_in_team(team_id, false)?);
        let mut resolver = DateResolver::new(&frame, self.today);
        let graph = DependencyGraph::from_tasks(frame.tasks());

        let mut tasks = Vec::with_capacity(frame.len());
        for task in frame.tasks() {
            let (span, degraded) = match resolver.resolve(task.id) {
                Ok(span) => (span, false),
                Err(err) => {
                    warn!(task = task.id, error = %err, "could not resolve dates; showing one-day default");
                    (DateSpan::single_day(self.today), true)
                }
            };

            let blocked = frame.is_blocked(task.id).unwrap_or_else(|err| {
                warn!(task = task.id, error = %err, "could not compute blocked flag");
                false
            });
            let latest = self.store.latest_feedback(task.id)?;
            let completable = completable_under(&project, latest.as_ref());

            tasks.push(TimelineTask {
                task: task.clone(),
                start: span.start,
                end: span.end,
                blocked,
                completable,
                degraded,
                dependents: graph.dependents_of(task.id).to_vec(),
            });
        }
        tasks.sort_by(|a, b| {
            (a.start, a.end, a.task.id).cmp(&(b.start, b.end, b.task.id))
        });

        let milestones = self.milestones_for(&project)?;
        let bounds = bounds_for(&project, &tasks, &milestones);

        debug!(
            team = team_id,
            tasks = tasks.len(),
            milestones = milestones.len(),
            "timeline assembled"
        );

        Ok(Timeline {
            team_id: team.id,
            project_id: project.id,
            bounds,
            tasks,
            milestones,
        })
    }

    fn milestones_for(&self, project: &Project) -> Result<Vec<Milestone>> {
        let mut milestones = self
            .store
            .milestones(&MilestoneScope::Project(project.id.clone()))?;
        milestones.extend(
            self.store
                .milestones(&MilestoneScope::Class(project.class_id.clone()))?,
        );
        milestones.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(milestones)
    }
}

/// Pinned project dates win; otherwise the envelope of tasks and milestones.
fn bounds_for(
    project: &Project,
    tasks: &[TimelineTask],
    milestones: &[Milestone],
) -> Option<ProjectBounds> {
    let starts = tasks
        .iter()
        .map(|t| t.start)
        .chain(milestones.iter().map(|m| m.due_date));
    let ends = tasks
        .iter()
        .map(|t| t.end)
        .chain(milestones.iter().map(|m| m.due_date));

    let start = project.start_date.or_else(|| starts.min())?;
    let end = project.end_date.or_else(|| ends.max())?;

    Some(ProjectBounds {
        start,
        end: end.max(start),
    })
}
