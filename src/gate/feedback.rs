// src/gate/feedback.rs

//! Critique submissions as supplied by a reviewer.

use serde::Deserialize;

use crate::errors::{Result, TaskgateError};

/// Reviewer input for [`super::CompletionGate::submit_feedback`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedbackInput {
    /// What works well.
    #[serde(default)]
    pub warm_feedback: String,
    /// What should change.
    #[serde(default)]
    pub cool_feedback: String,
    /// Sends the task back to `doing` when set.
    #[serde(default)]
    pub requires_revision: bool,
    /// The reviewer confirmed they went through the checklist.
    #[serde(default)]
    pub checklist_confirmed: bool,
}

impl FeedbackInput {
    pub fn approve(warm: impl Into<String>) -> Self {
        Self {
            warm_feedback: warm.into(),
            checklist_confirmed: true,
            ..Self::default()
        }
    }

    pub fn request_revision(cool: impl Into<String>) -> Self {
        Self {
            cool_feedback: cool.into(),
            requires_revision: true,
            checklist_confirmed: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.checklist_confirmed {
            return Err(TaskgateError::Validation(
                "the critique checklist must be confirmed before submitting".to_string(),
            ));
        }
        if self.warm_feedback.trim().is_empty() && self.cool_feedback.trim().is_empty() {
            return Err(TaskgateError::Validation(
                "at least one of warm or cool feedback must be provided".to_string(),
            ));
        }
        Ok(())
    }
}
