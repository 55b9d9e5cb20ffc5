// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `tm2bd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tm2bd",
    version,
    about = "Migrate a Task Master task list into a beads issue tracker.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `tm2bd.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--verbose`, then `TM2BD_LOG`, then `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Debug logging and full error chains.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create tracker issues for every task, subtask and test strategy,
    /// then wire dependencies and statuses.
    Sync(SyncArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Task Master `tasks.json` to read.
    #[arg(long, value_name = "PATH")]
    pub tasks: Option<PathBuf>,

    /// Workspace holding the initialized tracker (`.beads/`).
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Mapping file recording which issues were created for which tasks.
    #[arg(long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Tag to read from a tagged task file.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Print planned tracker operations without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Start over even if a mapping file exists.
    #[arg(long, conflicts_with = "resume")]
    pub force: bool,

    /// Continue from an existing mapping file, skipping what it already lists.
    #[arg(long)]
    pub resume: bool,
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
