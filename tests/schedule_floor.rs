mod common;

use common::{classroom, date, engine, ACTOR};
use taskgate::errors::TaskgateError;
use taskgate::schedule::{NewTask, TaskPatch};
use taskgate::model::AuditAction;
use taskgate::store::{Store, TaskStore};
use taskgate_test_utils::builders::TaskBuilder;

fn new_task(title: &str) -> NewTask {
    NewTask {
        team_id: Some("t1".to_string()),
        ..NewTask::new("p1", title)
    }
}

#[test]
fn dependent_is_pushed_to_the_day_after_its_dependency() {
    let engine = engine(false);

    let a = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                duration_days: Some(3),
                ..new_task("A")
            },
        )
        .unwrap();
    assert_eq!(a.end_date, Some(date("2024-01-03")));

    let b = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                duration_days: Some(2),
                dependencies: vec![a.id],
                ..new_task("B")
            },
        )
        .unwrap();

    assert_eq!(b.start_date, Some(date("2024-01-04")));
    assert_eq!(b.end_date, Some(date("2024-01-05")));
    assert_eq!(b.duration_days, Some(2));
}

#[test]
fn duration_is_derived_from_start_and_end() {
    let engine = engine(false);

    let task = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                end_date: Some(date("2024-01-10")),
                ..new_task("Essay")
            },
        )
        .unwrap();

    assert_eq!(task.duration_days, Some(10));
}

#[test]
fn explicit_end_wins_over_explicit_duration() {
    let engine = engine(false);

    let task = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                end_date: Some(date("2024-01-04")),
                duration_days: Some(9),
                ..new_task("Slides")
            },
        )
        .unwrap();

    assert_eq!(task.end_date, Some(date("2024-01-04")));
    assert_eq!(task.duration_days, Some(4));
}

#[test]
fn moving_the_start_keeps_the_duration() {
    let engine = engine(false);
    let task = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                duration_days: Some(5),
                ..new_task("Survey")
            },
        )
        .unwrap();

    let moved = engine
        .update_task(ACTOR, task.id, TaskPatch::default().start(date("2024-02-01")))
        .unwrap();

    assert_eq!(moved.start_date, Some(date("2024-02-01")));
    assert_eq!(moved.end_date, Some(date("2024-02-05")));
    assert_eq!(moved.duration_days, Some(5));
}

#[test]
fn floor_without_duration_moves_only_the_start() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").end("2024-01-10"))
        .engine();

    let task = engine
        .create_task(
            ACTOR,
            NewTask {
                due_date: Some(date("2024-01-31")),
                dependencies: vec![1],
                ..new_task("Report")
            },
        )
        .unwrap();

    assert_eq!(task.start_date, Some(date("2024-01-11")));
    assert_eq!(task.end_date, None);
    assert_eq!(task.due_date, Some(date("2024-01-31")));
    assert_eq!(task.duration_days, None);
}

#[test]
fn floor_falls_back_to_due_date_then_resolved_end() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").due("2024-01-08"))
        .task(TaskBuilder::new(2, "p1").team("t1").start("2024-01-01").duration(4))
        .engine();

    let after_due = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                dependencies: vec![1],
                ..new_task("after due")
            },
        )
        .unwrap();
    assert_eq!(after_due.start_date, Some(date("2024-01-09")));

    // Task 2 has no stored end or due date: its resolved end (01-04) is used.
    let after_resolved = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                dependencies: vec![2],
                ..new_task("after resolved")
            },
        )
        .unwrap();
    assert_eq!(after_resolved.start_date, Some(date("2024-01-05")));
}

#[test]
fn floor_only_pushes_forward_and_never_regresses() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").end("2024-01-10").duration(10))
        .engine();

    let dependent = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-02")),
                duration_days: Some(3),
                dependencies: vec![1],
                ..new_task("dependent")
            },
        )
        .unwrap();
    assert_eq!(dependent.start_date, Some(date("2024-01-11")));

    // Shrink the dependency.
    engine
        .update_task(ACTOR, 1, TaskPatch::default().end(date("2024-01-03")))
        .unwrap();

    // No cascade: the dependent's stored row is untouched.
    let stored = engine.store().task(dependent.id).unwrap().unwrap();
    assert_eq!(stored.start_date, Some(date("2024-01-11")));
    assert_eq!(stored.end_date, Some(date("2024-01-13")));

    // Re-saving the dependencies does not pull it earlier either.
    let resaved = engine
        .update_task(ACTOR, dependent.id, TaskPatch::default().dependencies([1]))
        .unwrap();
    assert_eq!(resaved.start_date, Some(date("2024-01-11")));
    assert_eq!(resaved.end_date, Some(date("2024-01-13")));
}

#[test]
fn saving_the_same_dependencies_twice_is_idempotent() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").end("2024-01-04"))
        .task(TaskBuilder::new(2, "p1").team("t1").start("2024-01-01").duration(2))
        .engine();

    let first = engine
        .update_task(ACTOR, 2, TaskPatch::default().dependencies([1]))
        .unwrap();
    let second = engine
        .update_task(ACTOR, 2, TaskPatch::default().dependencies([1]))
        .unwrap();

    assert_eq!(first.start_date, Some(date("2024-01-05")));
    assert_eq!(first.end_date, Some(date("2024-01-06")));
    assert_eq!(first, second);
}

#[test]
fn dependency_growth_is_picked_up_on_the_next_save() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").end("2024-01-04"))
        .task(TaskBuilder::new(2, "p1").team("t1").start("2024-01-05").duration(2).after(1))
        .engine();

    engine
        .update_task(ACTOR, 1, TaskPatch::default().end(date("2024-01-09")))
        .unwrap();
    let unchanged = engine.store().task(2).unwrap().unwrap();
    assert_eq!(unchanged.start_date, Some(date("2024-01-05")));

    let resaved = engine
        .update_task(ACTOR, 2, TaskPatch::default().dependencies([1]))
        .unwrap();
    assert_eq!(resaved.start_date, Some(date("2024-01-10")));
    assert_eq!(resaved.end_date, Some(date("2024-01-11")));
}

#[test]
fn unknown_dependency_is_not_found_and_writes_nothing() {
    let engine = engine(false);

    let err = engine
        .create_task(
            ACTOR,
            NewTask {
                dependencies: vec![404],
                ..new_task("orphan")
            },
        )
        .unwrap_err();

    assert!(matches!(err, TaskgateError::NotFound(_)), "got {err:?}");
    assert_eq!(engine.store().task_count().unwrap(), 0);
}

#[test]
fn dependency_from_another_project_is_rejected() {
    let engine = classroom(false)
        .project("p2", "c1", false)
        .task(TaskBuilder::new(1, "p2").start("2024-01-01"))
        .engine();

    let err = engine
        .create_task(
            ACTOR,
            NewTask {
                dependencies: vec![1],
                ..new_task("cross")
            },
        )
        .unwrap_err();

    assert!(matches!(err, TaskgateError::Validation(_)), "got {err:?}");
}

#[test]
fn dependency_edit_closing_a_cycle_is_rejected() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").duration(1))
        .task(TaskBuilder::new(2, "p1").team("t1").after(1).duration(1))
        .task(TaskBuilder::new(3, "p1").team("t1").after(2).duration(1))
        .engine();

    let before = engine.store().task(1).unwrap().unwrap();

    let err = engine
        .update_task(ACTOR, 1, TaskPatch::default().dependencies([3]).start(date("2024-05-01")))
        .unwrap_err();
    assert!(matches!(err, TaskgateError::CycleDetected(_)), "got {err:?}");

    let self_err = engine
        .update_task(ACTOR, 2, TaskPatch::default().dependencies([2]))
        .unwrap_err();
    assert!(matches!(self_err, TaskgateError::CycleDetected(2)));

    // All-or-nothing: the start change in the rejected patch was not applied.
    assert_eq!(engine.store().task(1).unwrap().unwrap(), before);
}

#[test]
fn invalid_dates_are_validation_errors() {
    let engine = engine(false);

    let zero = engine
        .create_task(
            ACTOR,
            NewTask {
                duration_days: Some(0),
                ..new_task("zero")
            },
        )
        .unwrap_err();
    assert!(matches!(zero, TaskgateError::Validation(_)));

    let backwards = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-10")),
                end_date: Some(date("2024-01-01")),
                ..new_task("backwards")
            },
        )
        .unwrap_err();
    assert!(matches!(backwards, TaskgateError::Validation(_)));

    let untitled = engine.create_task(ACTOR, new_task("  ")).unwrap_err();
    assert!(matches!(untitled, TaskgateError::Validation(_)));
}

#[test]
fn unknown_team_or_project_is_not_found() {
    let engine = engine(false);

    let no_project = engine
        .create_task(ACTOR, NewTask::new("nope", "x"))
        .unwrap_err();
    assert!(matches!(no_project, TaskgateError::NotFound(_)));

    let no_team = engine
        .create_task(
            ACTOR,
            NewTask {
                team_id: Some("ghost".to_string()),
                ..NewTask::new("p1", "x")
            },
        )
        .unwrap_err();
    assert!(matches!(no_team, TaskgateError::NotFound(_)));

    let no_task = engine
        .update_task(ACTOR, 999, TaskPatch::default())
        .unwrap_err();
    assert!(matches!(no_task, TaskgateError::NotFound(_)));
}

#[test]
fn soft_deleted_tasks_leave_scheduling_until_restored() {
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01"))
        .task(TaskBuilder::new(2, "p1").team("t1").start("2024-01-02"))
        .engine();

    let deleted = engine.soft_delete_task(ACTOR, 2).unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(engine.resolution_frame("t1", false).unwrap().len(), 1);
    assert_eq!(engine.resolution_frame("t1", true).unwrap().len(), 2);

    let edit = engine
        .update_task(ACTOR, 2, TaskPatch::default().duration(2))
        .unwrap_err();
    assert!(matches!(edit, TaskgateError::Validation(_)));

    let restored = engine.restore_task(ACTOR, 2).unwrap();
    assert!(!restored.is_deleted());
    assert_eq!(engine.resolution_frame("t1", false).unwrap().len(), 2);

    // Restoring a live task is a no-op and is not audited.
    engine.restore_task(ACTOR, 2).unwrap();
    let actions: Vec<AuditAction> = engine
        .store()
        .audit_trail(2)
        .unwrap()
        .iter()
        .map(|r| r.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::SoftDeleted, AuditAction::Restored]);
}

#[test]
fn soft_deleted_dependency_sets_no_floor_until_restored() {
    let engine = engine(false);
    let a = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                duration_days: Some(30),
                ..new_task("A")
            },
        )
        .unwrap();
    engine.soft_delete_task(ACTOR, a.id).unwrap();

    let b = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                duration_days: Some(2),
                dependencies: vec![a.id],
                ..new_task("B")
            },
        )
        .unwrap();
    assert_eq!(b.start_date, Some(date("2024-01-01")));
    assert_eq!(b.end_date, Some(date("2024-01-02")));
    assert_eq!(b.dependencies, vec![a.id]);

    // The timeline agrees: the deleted dependency does not move B.
    let row_start = engine.assemble_timeline("t1").unwrap().task(b.id).unwrap().start;
    assert_eq!(row_start, date("2024-01-01"));

    engine.restore_task(ACTOR, a.id).unwrap();
    let resaved = engine
        .update_task(ACTOR, b.id, TaskPatch::default().dependencies([a.id]))
        .unwrap();
    assert_eq!(resaved.start_date, Some(date("2024-01-31")));
    assert_eq!(resaved.end_date, Some(date("2024-02-01")));
}

#[test]
fn resolved_floor_ignores_deleted_tasks_upstream() {
    // 2 has no stored end, so its floor comes from resolution; its own
    // dependency 1 is deleted and must not push it.
    let engine = classroom(false)
        .task(TaskBuilder::new(1, "p1").team("t1").start("2024-01-01").end("2024-02-20").deleted())
        .task(TaskBuilder::new(2, "p1").team("t1").after(1).start("2024-01-01").duration(3))
        .engine();

    let dependent = engine
        .create_task(
            ACTOR,
            NewTask {
                start_date: Some(date("2024-01-01")),
                dependencies: vec![2],
                ..new_task("dependent")
            },
        )
        .unwrap();

    assert_eq!(dependent.start_date, Some(date("2024-01-04")));
}
