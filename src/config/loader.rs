// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawSnapshot, Snapshot};
use crate::errors::Result;

/// Load a snapshot file from a given path and return the raw `RawSnapshot`.
///
/// This only performs TOML deserialization; it does **not** check references
/// or the dependency graph. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSnapshot> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_raw(&contents)
}

pub fn parse_raw(contents: &str) -> Result<RawSnapshot> {
    let raw: RawSnapshot = toml::from_str(contents)?;
    Ok(raw)
}

/// Parse and validate snapshot contents already read into memory.
pub fn parse_and_validate(contents: &str) -> Result<Snapshot> {
    Snapshot::try_from(parse_raw(contents)?)
}

/// Load a snapshot file from path and validate it.
///
/// Checks for:
/// - unknown project, team and dependency references,
/// - self dependencies and dependency cycles,
/// - malformed milestones and zero durations.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Snapshot> {
    let raw = load_from_path(&path)?;
    Snapshot::try_from(raw)
}

/// Default snapshot location: `Taskgate.toml` in the working directory,
/// unless `TASKGATE_SNAPSHOT` points elsewhere.
pub fn default_snapshot_path() -> PathBuf {
    std::env::var_os("TASKGATE_SNAPSHOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Taskgate.toml"))
}
