// tests/property_resolver.rs

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use taskgate::dag::{DateResolver, ResolutionFrame};
use taskgate::dates::day_after;
use taskgate::engine::Engine;
use taskgate::model::{DateSpan, Task, TaskId};
use taskgate::schedule::{NewTask, TaskPatch};
use taskgate::store::InMemoryStore;
use taskgate_test_utils::builders::{StoreBuilder, TaskBuilder};
use taskgate_test_utils::date;

const TODAY: &str = "2024-03-01";

/// One generated task: optional start offset from 2024-01-01, optional
/// duration, and raw dependency picks that are folded onto earlier tasks.
type TaskSeed = (Option<u8>, Option<u32>, Vec<usize>);

// Acyclic by construction: task i may only depend on tasks 1..i.
fn seeds_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<TaskSeed>> {
    proptest::collection::vec(
        (
            proptest::option::of(0u8..90),
            proptest::option::of(1u32..10),
            proptest::collection::vec(any::<usize>(), 0..3),
        ),
        1..=max_tasks,
    )
}

fn day(offset: u8) -> NaiveDate {
    date("2024-01-01") + Days::new(u64::from(offset))
}

fn deps_for(index: usize, raw: &[usize]) -> Vec<TaskId> {
    let mut deps: Vec<TaskId> = Vec::new();
    if index == 0 {
        return deps;
    }
    for pick in raw {
        let dep = (pick % index) as TaskId + 1;
        if !deps.contains(&dep) {
            deps.push(dep);
        }
    }
    deps
}

fn frame_from(seeds: &[TaskSeed]) -> ResolutionFrame {
    let tasks = seeds.iter().enumerate().map(|(i, (start, duration, raw))| {
        let mut task: Task = TaskBuilder::new(i as TaskId + 1, "p1").build();
        task.start_date = start.map(day);
        task.duration_days = *duration;
        task.dependencies = deps_for(i, raw);
        task
    });
    ResolutionFrame::new(tasks)
}

fn classroom_engine() -> Engine<InMemoryStore> {
    StoreBuilder::new()
        .today(TODAY)
        .project("p1", "c1", false)
        .team("t1", "p1")
        .engine()
}

proptest! {
    #[test]
    fn resolved_spans_respect_dependencies(seeds in seeds_strategy(12)) {
        let frame = frame_from(&seeds);
        let today = date(TODAY);
        let mut resolver = DateResolver::new(&frame, today);

        let mut spans: BTreeMap<TaskId, DateSpan> = BTreeMap::new();
        for task in frame.tasks() {
            let span = resolver.resolve(task.id).unwrap();
            spans.insert(task.id, span);
        }

        for task in frame.tasks() {
            let span = spans[&task.id];
            prop_assert!(span.end >= span.start);

            let baseline = task.start_date.unwrap_or(today);
            let latest_dep_end = task.dependencies.iter().map(|d| spans[d].end).max();
            let expected_start = latest_dep_end.map_or(baseline, |end| end.max(baseline));
            prop_assert_eq!(span.start, expected_start);
        }
    }

    #[test]
    fn created_tasks_start_after_their_dependencies(seeds in seeds_strategy(8)) {
        let engine = classroom_engine();
        let frame_today = date(TODAY);

        for (i, (start, duration, raw)) in seeds.iter().enumerate() {
            let deps = deps_for(i, raw);

            // Expected floor: stored end, else due, else resolved end.
            let frame = engine.resolution_frame("t1", true).unwrap();
            let mut resolver = DateResolver::new(&frame, frame_today);
            let mut floor: Option<NaiveDate> = None;
            for dep in &deps {
                let stored = frame.get(*dep).unwrap();
                let end = match stored.stored_end() {
                    Some(end) => end,
                    None => resolver.resolve(*dep).unwrap().end,
                };
                let next = day_after(end).unwrap();
                floor = Some(floor.map_or(next, |f| f.max(next)));
            }

            let created = engine
                .create_task(
                    "student",
                    NewTask {
                        team_id: Some("t1".to_string()),
                        start_date: start.map(day),
                        duration_days: *duration,
                        dependencies: deps.clone(),
                        ..NewTask::new("p1", format!("task {i}"))
                    },
                )
                .unwrap();

            if let Some(floor) = floor {
                let created_start = created.start_date.unwrap();
                prop_assert!(created_start >= floor);
                if let Some(requested) = start.map(day) {
                    prop_assert_eq!(created_start, requested.max(floor));
                }
            }
            if let (Some(s), Some(d)) = (created.start_date, created.duration_days) {
                prop_assert_eq!(created.end_date, Some(s + Days::new(u64::from(d) - 1)));
            }

            let resaved = engine
                .update_task("student", created.id, TaskPatch::default().dependencies(deps))
                .unwrap();
            prop_assert_eq!(resaved, created);
        }
    }
}
