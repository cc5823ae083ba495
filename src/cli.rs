// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::TaskId;

/// Command-line arguments for `taskgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskgate",
    version,
    about = "Resolve task schedules and completion gates from a project snapshot.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the snapshot file (TOML).
    ///
    /// Default: `TASKGATE_SNAPSHOT`, else `Taskgate.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKGATE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse + validate the snapshot and print a summary.
    Check,

    /// Print the resolved timeline of a team.
    Timeline {
        #[arg(long, value_name = "TEAM")]
        team: String,

        /// Emit JSON instead of a text table.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective start/end of a task.
    Resolve {
        #[arg(long, value_name = "ID")]
        task: TaskId,

        /// Resolution frame; defaults to the task's own team.
        #[arg(long, value_name = "TEAM")]
        team: Option<String>,
    },

    /// Print whether a task is blocked by unfinished dependencies.
    Blocked {
        #[arg(long, value_name = "ID")]
        task: TaskId,

        #[arg(long, value_name = "TEAM")]
        team: Option<String>,
    },

    /// Print whether a task may be moved to `done`.
    Completable {
        #[arg(long, value_name = "ID")]
        task: TaskId,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
