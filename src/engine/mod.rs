// src/engine/mod.rs

//! The operation surface consumed by the HTTP layer.
//!
//! [`Engine`] binds a [`Store`] to an [`EngineConfig`] and hands out the
//! schedule mutator, completion gate and timeline assembler for each call.
//! All mutating operations take the caller's identity explicitly.

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::dag::{resolve_dates, ResolutionFrame};
use crate::errors::{Result, TaskgateError};
use crate::gate::{CompletionGate, FeedbackInput};
use crate::model::{DateSpan, FeedbackEntry, Task, TaskId};
use crate::schedule::{NewTask, ScheduleMutator, TaskPatch};
use crate::store::Store;
use crate::timeline::{Timeline, TimelineAssembler};

/// `[engine]` section of a snapshot file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Pin "today" (e.g. `"2024-01-10"`); defaults to the local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.config
            .today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn create_task(&self, actor_id: &str, input: NewTask) -> Result<Task> {
        self.mutator().create_task(actor_id, input)
    }

    pub fn update_task(&self, actor_id: &str, id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.mutator().update_task(actor_id, id, patch)
    }

    pub fn soft_delete_task(&self, actor_id: &str, id: TaskId) -> Result<Task> {
        self.mutator().soft_delete_task(actor_id, id)
    }

    pub fn restore_task(&self, actor_id: &str, id: TaskId) -> Result<Task> {
        self.mutator().restore_task(actor_id, id)
    }

    /// Live tasks of a team, or all of them with `include_deleted`.
    pub fn resolution_frame(&self, team_id: &str, include_deleted: bool) -> Result<ResolutionFrame> {
        if self.store.team(team_id)?.is_none() {
            return Err(TaskgateError::NotFound(format!("team {team_id}")));
        }
        Ok(ResolutionFrame::new(
            self.store.tasks_in_team(team_id, include_deleted)?,
        ))
    }

    /// Default frame for a task: its team, or its project when it has none.
    pub fn frame_for_task(&self, task_id: TaskId) -> Result<ResolutionFrame> {
        let task = self
            .store
            .task(task_id)?
            .ok_or_else(|| TaskgateError::task_not_found(task_id))?;
        match task.team_id.as_deref() {
            Some(team_id) => self.resolution_frame(team_id, false),
            None => Ok(ResolutionFrame::new(
                self.store.tasks_in_project(&task.project_id, false)?,
            )),
        }
    }

    pub fn resolve_dates(&self, task_id: TaskId, frame: &ResolutionFrame) -> Result<DateSpan> {
        resolve_dates(frame, task_id, self.today())
    }

    pub fn is_blocked(&self, task_id: TaskId, frame: &ResolutionFrame) -> Result<bool> {
        frame.is_blocked(task_id)
    }

    pub fn is_completable(&self, task_id: TaskId) -> Result<bool> {
        CompletionGate::new(&self.store).is_completable(task_id)
    }

    pub fn submit_feedback(
        &self,
        author_id: &str,
        task_id: TaskId,
        input: FeedbackInput,
    ) -> Result<FeedbackEntry> {
        CompletionGate::new(&self.store).submit_feedback(author_id, task_id, input)
    }

    pub fn feedback_history(&self, task_id: TaskId) -> Result<Vec<FeedbackEntry>> {
        CompletionGate::new(&self.store).feedback_history(task_id)
    }

    pub fn assemble_timeline(&self, team_id: &str) -> Result<Timeline> {
        TimelineAssembler::new(&self.store, self.today()).assemble(team_id)
    }

    fn mutator(&self) -> ScheduleMutator<'_, S> {
        ScheduleMutator::new(&self.store, self.today())
    }
}
