// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::model::TaskId;

#[derive(Error, Debug)]
pub enum TaskgateError {
    /// Missing or inconsistent input (empty feedback, zero duration, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The dependency graph contains a cycle passing through this task.
    #[error("Cycle detected in dependency graph at task {0}")]
    CycleDetected(TaskId),

    /// A `done` transition was attempted while the task is not completable.
    ///
    /// Kept apart from `Validation` so callers can prompt for a critique
    /// instead of reporting a plain failure.
    #[error("Task {0} cannot be completed until a critique approves it")]
    GateRefused(TaskId),

    /// A row the write was computed against changed before it committed.
    #[error("Task {0} was changed by another writer; reload and retry")]
    Conflict(TaskId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskgateError {
    pub fn task_not_found(id: TaskId) -> Self {
        TaskgateError::NotFound(format!("task {id}"))
    }

    /// Whether this error should be surfaced as "request a critique".
    pub fn is_gate_refusal(&self) -> bool {
        matches!(self, TaskgateError::GateRefused(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskgateError>;
