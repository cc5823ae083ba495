// src/config/mod.rs

//! Snapshot files for taskgate.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a snapshot from disk (`loader.rs`).
//! - Validate references and dependency acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_snapshot_path, load_and_validate, load_from_path, parse_and_validate};
pub use model::{
    FeedbackSection, MilestoneSection, ProjectSection, RawSnapshot, Snapshot, TaskSection,
    TeamSection,
};
