#![allow(dead_code)]

use taskgate::engine::Engine;
use taskgate::model::MilestoneScope;
use taskgate::store::InMemoryStore;
use taskgate_test_utils::builders::{StoreBuilder, TaskBuilder};

pub use taskgate_test_utils::{date, init_tracing};

pub const TODAY: &str = "2024-03-01";
pub const ACTOR: &str = "student-1";
pub const REVIEWER: &str = "reviewer-7";

/// One class, one project, one team; critique policy configurable.
pub fn classroom(require_critique: bool) -> StoreBuilder {
    init_tracing();
    StoreBuilder::new()
        .today(TODAY)
        .project("p1", "c1", require_critique)
        .team("t1", "p1")
}

/// Engine over an empty classroom project.
pub fn engine(require_critique: bool) -> Engine<InMemoryStore> {
    classroom(require_critique).engine()
}

/// Team `t1` with tasks A(1) -> B(2) -> C(3) plus a loose task D(4) and
/// milestones on both project and class level.
pub fn chain_with_milestones() -> Engine<InMemoryStore> {
    classroom(true)
        .task(TaskBuilder::new(1, "p1").team("t1").title("A").start("2024-01-01").end("2024-01-03"))
        .task(TaskBuilder::new(2, "p1").team("t1").title("B").after(1).start("2024-01-01").duration(2))
        .task(TaskBuilder::new(3, "p1").team("t1").title("C").after(2).duration(1))
        .task(TaskBuilder::new(4, "p1").team("t1").title("D").start("2023-12-20").end("2023-12-22"))
        .milestone("Final demo", "2024-02-01", MilestoneScope::Class("c1".into()))
        .milestone("Proposal", "2024-01-05", MilestoneScope::Project("p1".into()))
        .milestone("Other class", "2024-01-02", MilestoneScope::Class("c2".into()))
        .engine()
}
