// src/schedule/mod.rs

//! Write path for tasks.
//!
//! - [`request`] defines create/update inputs.
//! - [`stored_dates`] keeps start, end and duration consistent.
//! - [`mutator`] validates requests, applies the dependency floor and the
//!   completion gate, and commits.
//!
//! The dependency floor is one-directional: a task's start is pushed to the
//! day after its latest dependency ends, and is never pulled back when a
//! dependency later shrinks. Saving the same dependencies twice is
//! idempotent.

pub mod mutator;
pub mod request;
pub mod stored_dates;

pub use mutator::ScheduleMutator;
pub use request::{NewTask, TaskPatch};
pub use stored_dates::{DateChange, StoredDates};
