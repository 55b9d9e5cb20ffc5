// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod mapping;
pub mod source;
pub mod sync;
pub mod tracker;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, SyncArgs};
use crate::config::{Settings, load_settings};
use crate::mapping::MappingStore;
use crate::source::{TaskSource, load_task_source};
use crate::sync::{RunMode, SyncOrchestrator, SyncReport};
use crate::tracker::{BdTracker, DryRunTracker};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    match args.command {
        Command::Sync(sync_args) => run_sync(&settings, sync_args).await,
    }
}

/// Paths and options of a sync run after merging flags over settings.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub tasks_path: PathBuf,
    pub workspace: PathBuf,
    pub mapping_path: PathBuf,
    pub tag: String,
}

impl SyncPlan {
    pub fn new(settings: &Settings, args: &SyncArgs) -> Self {
        let tasks_path = args
            .tasks
            .clone()
            .unwrap_or_else(|| args.workspace.join(&settings.sync.tasks_file));
        let mapping_path = args
            .mapping
            .clone()
            .unwrap_or_else(|| args.workspace.join(&settings.sync.mapping_file));
        Self {
            tasks_path,
            workspace: args.workspace.clone(),
            mapping_path,
            tag: args.tag.clone().unwrap_or_else(|| settings.sync.tag.clone()),
        }
    }
}

async fn run_sync(settings: &Settings, args: SyncArgs) -> Result<()> {
    let plan = SyncPlan::new(settings, &args);
    info!(
        tasks = ?plan.tasks_path,
        workspace = ?plan.workspace,
        mapping = ?plan.mapping_path,
        tag = %plan.tag,
        "starting sync"
    );

    let TaskSource { tasks, digest } = load_task_source(&plan.tasks_path, &plan.tag)?;
    info!(
        tasks = tasks.len(),
        subtasks = tasks.subtask_count(),
        test_strategies = tasks.test_strategy_count(),
        "task list loaded"
    );

    let status_names = settings.tracker.status_names();

    if args.dry_run {
        println!("tm2bd dry-run: planned tracker operations");
        let mut orchestrator = SyncOrchestrator::new(DryRunTracker::new(), MappingStore::new())
            .with_status_names(status_names);
        let report = orchestrator.run(&tasks).await?;
        println!();
        println!(
            "dry-run complete: {} operations planned, nothing written",
            orchestrator.tracker().operations()
        );
        print_report(&report);
        return Ok(());
    }

    let mode = RunMode::select(&plan.mapping_path, args.force, args.resume)?;
    let mut store = mode.initial_store(&plan.mapping_path)?;
    info!(mode = ?mode, "mapping store ready");

    if mode == RunMode::Resumed {
        match store.source_digest() {
            Some(previous) if previous != digest => {
                warn!("task file changed since the mapping was written; new tasks will be created, changed ones will not be updated");
            }
            _ => {}
        }
    }
    store.set_source_digest(digest);

    let tracker = BdTracker::new(settings.tracker.binary.clone(), plan.workspace.clone());
    let mut orchestrator = SyncOrchestrator::new(tracker, store)
        .with_status_names(status_names)
        .persist_to(plan.mapping_path.clone())
        .with_progress(|stage, done, total| {
            info!(stage = %stage, "{done}/{total}");
        });

    let report = orchestrator.run(&tasks).await?;
    print_report(&report);
    println!("mapping written to {}", plan.mapping_path.display());
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("sync summary:");
    println!(
        "  epics:              {} created, {} already present",
        report.top_level.created, report.top_level.skipped
    );
    println!(
        "  subtasks:           {} created, {} already present",
        report.children.created, report.children.skipped
    );
    println!(
        "  verification items: {} created, {} already present",
        report.verification.created, report.verification.skipped
    );
    println!(
        "  dependencies:       {} wired ({} verification)",
        report.dependencies + report.verification_edges,
        report.verification_edges
    );
    println!(
        "  statuses:           {} updated, {} closed",
        report.statuses.updated, report.statuses.closed
    );
    println!(
        "  mapping:            {} tasks, {} subtasks, {} verification items",
        report.summary.top_level, report.summary.children, report.summary.verification
    );
}
