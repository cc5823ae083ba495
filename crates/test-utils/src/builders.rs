#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use taskgate::engine::{Engine, EngineConfig};
use taskgate::model::{Milestone, MilestoneScope, Project, Task, TaskId, Team};
use taskgate::store::InMemoryStore;
use taskgate::types::{Priority, TaskStatus};

use crate::date;

/// Builder for stored task rows, to seed a store directly.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: TaskId, project_id: &str) -> Self {
        Self {
            task: Task {
                id,
                project_id: project_id.to_string(),
                team_id: None,
                assignee_id: None,
                title: format!("task {id}"),
                status: TaskStatus::Todo,
                priority: Priority::Medium,
                dependencies: vec![],
                start_date: None,
                end_date: None,
                due_date: None,
                duration_days: None,
                deleted_at: None,
            },
        }
    }

    pub fn team(mut self, team_id: &str) -> Self {
        self.task.team_id = Some(team_id.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn after(mut self, dep: TaskId) -> Self {
        self.task.dependencies.push(dep);
        self
    }

    pub fn start(mut self, d: &str) -> Self {
        self.task.start_date = Some(date(d));
        self
    }

    pub fn end(mut self, d: &str) -> Self {
        self.task.end_date = Some(date(d));
        self
    }

    pub fn due(mut self, d: &str) -> Self {
        self.task.due_date = Some(date(d));
        self
    }

    pub fn duration(mut self, days: u32) -> Self {
        self.task.duration_days = Some(days);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.task.deleted_at = Some(Utc::now());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for an `InMemoryStore` (and optionally an `Engine` over it).
pub struct StoreBuilder {
    store: InMemoryStore,
    today: Option<NaiveDate>,
    next_milestone: u64,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            today: None,
            next_milestone: 0,
        }
    }

    pub fn project(self, id: &str, class_id: &str, require_critique: bool) -> Self {
        self.project_with(Project {
            id: id.to_string(),
            class_id: class_id.to_string(),
            require_critique,
            start_date: None,
            end_date: None,
        })
    }

    pub fn project_with(self, project: Project) -> Self {
        self.store
            .insert_project(project)
            .expect("insert project into test store");
        self
    }

    pub fn team(self, id: &str, project_id: &str) -> Self {
        self.store
            .insert_team(Team {
                id: id.to_string(),
                project_id: project_id.to_string(),
            })
            .expect("insert team into test store");
        self
    }

    pub fn task(self, task: TaskBuilder) -> Self {
        self.store
            .insert_task(task.build())
            .expect("insert task into test store");
        self
    }

    pub fn milestone(mut self, title: &str, due: &str, scope: MilestoneScope) -> Self {
        self.next_milestone += 1;
        self.store
            .insert_milestone(Milestone {
                id: self.next_milestone,
                title: title.to_string(),
                due_date: date(due),
                scope,
            })
            .expect("insert milestone into test store");
        self
    }

    /// Pin "today" for engines built from this builder.
    pub fn today(mut self, d: &str) -> Self {
        self.today = Some(date(d));
        self
    }

    pub fn build(self) -> InMemoryStore {
        self.store
    }

    pub fn engine(self) -> Engine<InMemoryStore> {
        let config = EngineConfig { today: self.today };
        Engine::new(self.store, config)
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
