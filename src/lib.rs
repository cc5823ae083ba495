// src/lib.rs

pub mod board;
pub mod cli;
pub mod config;
pub mod dag;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod store;
pub mod timeline;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{default_snapshot_path, parse_and_validate, Snapshot};
use crate::dag::ResolutionFrame;
use crate::engine::Engine;
use crate::model::TaskId;
use crate::store::InMemoryStore;
use crate::timeline::Timeline;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the snapshot, seeds an in-memory store and runs one
/// read-only query against it.
pub async fn run(args: CliArgs) -> Result<()> {
    let path = args
        .snapshot
        .map(PathBuf::from)
        .unwrap_or_else(default_snapshot_path);

    let contents = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading snapshot {:?}", path))?;
    let snapshot = parse_and_validate(&contents)?;
    info!(path = ?path, tasks = snapshot.tasks().len(), "snapshot loaded");

    if let Command::Check = args.command {
        print_check(&snapshot);
        return Ok(());
    }

    let store = InMemoryStore::from_snapshot(&snapshot)?;
    let engine = Engine::new(store, snapshot.engine().clone());

    match args.command {
        Command::Check => {}
        Command::Timeline { team, json } => {
            let timeline = engine.assemble_timeline(&team)?;
            if json {
                println!("{}", timeline.to_json_pretty()?);
            } else {
                print_timeline(&timeline);
            }
        }
        Command::Resolve { task, team } => {
            let frame = frame_for(&engine, task, team.as_deref())?;
            let span = engine.resolve_dates(task, &frame)?;
            println!("task {task}: {} .. {}", span.start, span.end);
        }
        Command::Blocked { task, team } => {
            let frame = frame_for(&engine, task, team.as_deref())?;
            println!("task {task}: blocked = {}", engine.is_blocked(task, &frame)?);
        }
        Command::Completable { task } => {
            println!("task {task}: completable = {}", engine.is_completable(task)?);
        }
    }

    Ok(())
}

fn frame_for(
    engine: &Engine<InMemoryStore>,
    task: TaskId,
    team: Option<&str>,
) -> crate::errors::Result<ResolutionFrame> {
    match team {
        Some(team) => engine.resolution_frame(team, false),
        None => engine.frame_for_task(task),
    }
}

/// Summary of a validated snapshot: projects, teams and task counts.
fn print_check(snapshot: &Snapshot) {
    println!("taskgate check");
    if let Some(today) = snapshot.engine().today {
        println!("  engine.today = {today}");
    }
    println!();

    println!("projects ({}):", snapshot.projects().len());
    for project in snapshot.projects() {
        println!(
            "  - {} (class {}, require_critique = {})",
            project.id, project.class_id, project.require_critique
        );
    }

    println!("teams ({}):", snapshot.teams().len());
    for team in snapshot.teams() {
        let count = snapshot
            .tasks()
            .iter()
            .filter(|t| t.team_id.as_deref() == Some(team.id.as_str()))
            .count();
        println!("  - {} (project {}, {count} tasks)", team.id, team.project_id);
    }

    let deleted = snapshot.tasks().iter().filter(|t| t.is_deleted()).count();
    println!("tasks: {} ({deleted} deleted)", snapshot.tasks().len());
    println!("feedback entries: {}", snapshot.feedback().len());
    println!("milestones: {}", snapshot.milestones().len());

    debug!("check complete (no queries run)");
}

fn print_timeline(timeline: &Timeline) {
    println!("team {} (project {})", timeline.team_id, timeline.project_id);
    if let Some(bounds) = timeline.bounds {
        println!("  bounds: {} .. {}", bounds.start, bounds.end);
    }
    println!();

    for row in timeline.tasks.iter() {
        let mut flags = Vec::new();
        if row.blocked {
            flags.push("blocked");
        }
        if !row.completable {
            flags.push("needs-critique");
        }
        if row.degraded {
            flags.push("degraded");
        }
        println!(
            "  #{:<4} {} .. {}  [{:<5}] {}{}",
            row.task.id,
            row.start,
            row.end,
            row.task.status,
            row.task.title,
            if flags.is_empty() {
                String::new()
            } else {
                format!("  ({})", flags.join(", "))
            }
        );
        if !row.dependents.is_empty() {
            let ids: Vec<String> = row.dependents.iter().map(|id| format!("#{id}")).collect();
            println!("         unblocks {}", ids.join(", "));
        }
    }

    if !timeline.milestones.is_empty() {
        println!();
        println!("milestones:");
        for m in timeline.milestones.iter() {
            println!("  {}  {}", m.due_date, m.title);
        }
    }
}
