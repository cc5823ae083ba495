// src/config/validate.rs

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config::model::{RawSnapshot, Snapshot, TaskSection};
use crate::dag::DependencyGraph;
use crate::errors::{Result, TaskgateError};
use crate::model::{FeedbackEntry, Milestone, MilestoneScope, Project, Task, TaskId, Team};

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = TaskgateError;

    fn try_from(raw: RawSnapshot) -> std::result::Result<Self, Self::Error> {
        let projects = build_projects(&raw)?;
        let teams = build_teams(&raw, &projects)?;
        let tasks = build_tasks(&raw, &projects, &teams)?;
        validate_dependencies(&tasks)?;
        let feedback = build_feedback(&raw, &tasks)?;
        let milestones = build_milestones(&raw, &projects)?;

        Ok(Snapshot::new_unchecked(
            raw.engine,
            projects.into_values().collect(),
            teams.into_values().collect(),
            tasks.into_values().collect(),
            feedback,
            milestones,
        ))
    }
}

fn build_projects(raw: &RawSnapshot) -> Result<BTreeMap<String, Project>> {
    let mut projects = BTreeMap::new();
    for (id, section) in raw.project.iter() {
        if let (Some(start), Some(end)) = (section.start_date, section.end_date) {
            if end < start {
                return Err(TaskgateError::Config(format!(
                    "project '{id}' ends ({end}) before it starts ({start})"
                )));
            }
        }
        projects.insert(
            id.clone(),
            Project {
                id: id.clone(),
                class_id: section.class_id.clone(),
                require_critique: section.require_critique,
                start_date: section.start_date,
                end_date: section.end_date,
            },
        );
    }
    Ok(projects)
}

fn build_teams(
    raw: &RawSnapshot,
    projects: &BTreeMap<String, Project>,
) -> Result<BTreeMap<String, Team>> {
    let mut teams = BTreeMap::new();
    for (id, section) in raw.team.iter() {
        if !projects.contains_key(&section.project_id) {
            return Err(TaskgateError::Config(format!(
                "team '{id}' references unknown project '{}'",
                section.project_id
            )));
        }
        teams.insert(
            id.clone(),
            Team {
                id: id.clone(),
                project_id: section.project_id.clone(),
            },
        );
    }
    Ok(teams)
}

fn build_tasks(
    raw: &RawSnapshot,
    projects: &BTreeMap<String, Project>,
    teams: &BTreeMap<String, Team>,
) -> Result<BTreeMap<TaskId, Task>> {
    let mut tasks = BTreeMap::new();
    for (key, section) in raw.task.iter() {
        let id: TaskId = key.trim().parse().map_err(|_| {
            TaskgateError::Config(format!("task key '{key}' is not a numeric task id"))
        })?;
        check_task_section(id, section, projects, teams)?;

        tasks.insert(
            id,
            Task {
                id,
                project_id: section.project_id.clone(),
                team_id: section.team_id.clone(),
                assignee_id: section.assignee_id.clone(),
                title: section.title.clone(),
                status: section.status,
                priority: section.priority,
                dependencies: section.dependencies.clone(),
                start_date: section.start_date,
                end_date: section.end_date,
                due_date: section.due_date,
                duration_days: section.duration_days,
                deleted_at: section.deleted.then(Utc::now),
            },
        );
    }
    Ok(tasks)
}

fn check_task_section(
    id: TaskId,
    section: &TaskSection,
    projects: &BTreeMap<String, Project>,
    teams: &BTreeMap<String, Team>,
) -> Result<()> {
    if !projects.contains_key(&section.project_id) {
        return Err(TaskgateError::Config(format!(
            "task {id} references unknown project '{}'",
            section.project_id
        )));
    }
    if let Some(team_id) = section.team_id.as_ref() {
        match teams.get(team_id) {
            None => {
                return Err(TaskgateError::Config(format!(
                    "task {id} references unknown team '{team_id}'"
                )));
            }
            Some(team) if team.project_id != section.project_id => {
                return Err(TaskgateError::Config(format!(
                    "task {id} is in project '{}' but team '{team_id}' is in '{}'",
                    section.project_id, team.project_id
                )));
            }
            Some(_) => {}
        }
    }
    if section.duration_days == Some(0) {
        return Err(TaskgateError::Config(format!(
            "task {id} has duration_days = 0 (must be >= 1)"
        )));
    }
    Ok(())
}

fn validate_dependencies(tasks: &BTreeMap<TaskId, Task>) -> Result<()> {
    for task in tasks.values() {
        for dep in task.dependencies.iter() {
            if *dep == task.id {
                return Err(TaskgateError::CycleDetected(task.id));
            }
            let Some(dep_task) = tasks.get(dep) else {
                return Err(TaskgateError::Config(format!(
                    "task {} has unknown dependency {dep}",
                    task.id
                )));
            };
            if dep_task.project_id != task.project_id {
                return Err(TaskgateError::Config(format!(
                    "task {} depends on task {dep} from another project",
                    task.id
                )));
            }
        }
    }

    DependencyGraph::from_tasks(tasks.values()).check_acyclic()
}

fn build_feedback(
    raw: &RawSnapshot,
    tasks: &BTreeMap<TaskId, Task>,
) -> Result<Vec<FeedbackEntry>> {
    let now = Utc::now();
    let mut entries = Vec::with_capacity(raw.feedback.len());

    for (index, section) in raw.feedback.iter().enumerate() {
        if !tasks.contains_key(&section.task_id) {
            return Err(TaskgateError::Config(format!(
                "feedback references unknown task {}",
                section.task_id
            )));
        }
        entries.push(FeedbackEntry {
            id: index as u64 + 1,
            task_id: section.task_id,
            author_id: section.author_id.clone(),
            warm_feedback: section.warm_feedback.clone(),
            cool_feedback: section.cool_feedback.clone(),
            requires_revision: section.requires_revision,
            checklist_confirmed: section.checklist_confirmed,
            created_at: now,
        });
    }
    Ok(entries)
}

fn build_milestones(
    raw: &RawSnapshot,
    projects: &BTreeMap<String, Project>,
) -> Result<Vec<Milestone>> {
    let mut milestones = Vec::with_capacity(raw.milestone.len());
    for (index, section) in raw.milestone.iter().enumerate() {
        let scope = match (&section.project_id, &section.class_id) {
            (Some(project_id), None) => {
                if !projects.contains_key(project_id) {
                    return Err(TaskgateError::Config(format!(
                        "milestone '{}' references unknown project '{project_id}'",
                        section.title
                    )));
                }
                MilestoneScope::Project(project_id.clone())
            }
            (None, Some(class_id)) => MilestoneScope::Class(class_id.clone()),
            _ => {
                return Err(TaskgateError::Config(format!(
                    "milestone '{}' must set exactly one of project_id or class_id",
                    section.title
                )));
            }
        };
        milestones.push(Milestone {
            id: index as u64 + 1,
            title: section.title.clone(),
            due_date: section.due_date,
            scope,
        });
    }
    Ok(milestones)
}
