// src/dag/mod.rs

//! Dependency graph and read-time date resolution.
//!
//! - [`graph`] holds adjacency information plus cycle checks.
//! - [`frame`] defines the task set a resolution runs over and the
//!   blocked-status rule.
//! - [`resolver`] computes effective start/end dates.

pub mod frame;
pub mod graph;
pub mod resolver;

pub use frame::ResolutionFrame;
pub use graph::DependencyGraph;
pub use resolver::{resolve_dates, DateResolver};
