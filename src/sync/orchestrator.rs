// src/sync/orchestrator.rs

//! Stage sequencing for one sync run.
//!
//! The orchestrator owns the [`MappingStore`] for the whole run and drives
//! the stages strictly in order:
//!
//! resolve-order -> create-top-level -> create-children ->
//! create-verification-items -> wire-dependencies -> reconcile-statuses ->
//! persist-store
//!
//! A failing stage aborts the run. Nothing created in the tracker is rolled
//! back; when a mapping path is configured the store has been checkpointed
//! after every creation, so a `--resume` run picks up where this one stopped.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::dag::resolve_order;
use crate::errors::{Result, SyncError};
use crate::mapping::{MappingStore, MappingSummary};
use crate::source::{Task, TaskList};
use crate::sync::creators::{
    StageCount, create_children, create_top_level, create_verification_items,
};
use crate::sync::status::{StatusCount, StatusNames, reconcile_statuses};
use crate::sync::wiring::{wire_children, wire_top_level, wire_verification};
use crate::sync::SyncStage;
use crate::tracker::{IssueTracker, TrackerOp};

/// How the mapping store for a run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// No mapping file existed.
    Fresh,
    /// A mapping file existed and is being ignored (`--force`).
    Forced,
    /// A mapping file existed and was reloaded (`--resume`).
    Resumed,
}

impl RunMode {
    /// Decide the run mode from whether `mapping_path` already holds a store
    /// and the `--force` / `--resume` flags. `force` wins over `resume`.
    pub fn select(mapping_path: &Path, force: bool, resume: bool) -> Result<RunMode> {
        let exists = MappingStore::exists(mapping_path);
        match (exists, force, resume) {
            (false, _, true) => {
                warn!(path = ?mapping_path, "--resume given but no mapping file exists; starting fresh");
                Ok(RunMode::Fresh)
            }
            (false, _, false) => Ok(RunMode::Fresh),
            (true, true, _) => Ok(RunMode::Forced),
            (true, false, true) => Ok(RunMode::Resumed),
            (true, false, false) => Err(SyncError::MappingExists(mapping_path.to_path_buf())),
        }
    }

    /// Build the store this mode starts from.
    pub fn initial_store(self, mapping_path: &Path) -> Result<MappingStore> {
        match self {
            RunMode::Fresh | RunMode::Forced => Ok(MappingStore::new()),
            RunMode::Resumed => MappingStore::load(mapping_path),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub top_level: StageCount,
    pub children: StageCount,
    pub verification: StageCount,
    /// New task and subtask blocked-by edges.
    pub dependencies: usize,
    /// New verification -> child edges.
    pub verification_edges: usize,
    pub statuses: StatusCount,
    pub completed_stages: Vec<SyncStage>,
    pub skipped_stages: Vec<SyncStage>,
    pub summary: MappingSummary,
}

type StageProgress = Box<dyn FnMut(SyncStage, usize, usize) + Send>;

/// Drives one sync run against an [`IssueTracker`].
pub struct SyncOrchestrator<T> {
    tracker: T,
    store: MappingStore,
    status_names: StatusNames,
    persist_path: Option<PathBuf>,
    progress: Option<StageProgress>,
}

impl<T: IssueTracker> SyncOrchestrator<T> {
    pub fn new(tracker: T, store: MappingStore) -> Self {
        Self {
            tracker,
            store,
            status_names: StatusNames::default(),
            persist_path: None,
            progress: None,
        }
    }

    pub fn with_status_names(mut self, names: StatusNames) -> Self {
        self.status_names = names;
        self
    }

    /// Persist the store to `path`: after every creation and new edge, and
    /// once more in the final stage. Without this the store stays in memory.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.store.enable_autosave(path.clone());
        self.persist_path = Some(path);
        self
    }

    /// Called after every issue a creation stage creates with `(stage, created, total)`.
    pub fn with_progress(
        mut self,
        progress: impl FnMut(SyncStage, usize, usize) + Send + 'static,
    ) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn into_parts(self) -> (T, MappingStore) {
        (self.tracker, self.store)
    }

    /// Run every stage over `tasks`.
    pub async fn run(&mut self, tasks: &TaskList) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        // resolve-order: no tracker call happens before the graphs are known to be sound.
        enter(SyncStage::ResolveOrder);
        let ordered: Vec<&Task> = resolve_order(tasks.tasks())?
            .into_iter()
            .map(|tiered| {
                debug!(task = tiered.node.id, tier = tiered.tier, "resolved");
                tiered.node
            })
            .collect();
        for task in tasks.tasks().iter().filter(|t| !t.subtasks.is_empty()) {
            resolve_order(&task.subtasks).map_err(|source| SyncError::SubtaskGraph {
                parent: task.id,
                source,
            })?;
        }
        report.completed_stages.push(SyncStage::ResolveOrder);

        self.ensure_initialized().await?;

        let Self {
            tracker,
            store,
            status_names,
            persist_path,
            progress,
        } = self;

        enter(SyncStage::CreateTopLevel);
        {
            let mut cb = stage_progress(progress, SyncStage::CreateTopLevel);
            report.top_level = create_top_level(tracker, store, &ordered, Some(&mut cb)).await?;
        }
        report.completed_stages.push(SyncStage::CreateTopLevel);

        if tasks.subtask_count() > 0 {
            enter(SyncStage::CreateChildren);
            let mut cb = stage_progress(progress, SyncStage::CreateChildren);
            report.children = create_children(tracker, store, &ordered, Some(&mut cb)).await?;
            report.completed_stages.push(SyncStage::CreateChildren);
        } else {
            skip(&mut report, SyncStage::CreateChildren, "no subtasks");
        }

        if tasks.test_strategy_count() > 0 {
            enter(SyncStage::CreateVerificationItems);
            let mut cb = stage_progress(progress, SyncStage::CreateVerificationItems);
            report.verification =
                create_verification_items(tracker, store, &ordered, Some(&mut cb)).await?;
            report.completed_stages.push(SyncStage::CreateVerificationItems);
        } else {
            skip(&mut report, SyncStage::CreateVerificationItems, "no test strategies");
        }

        enter(SyncStage::WireDependencies);
        report.dependencies = wire_top_level(tracker, store, &ordered).await?;
        report.dependencies += wire_children(tracker, store, &ordered).await?;
        report.verification_edges = wire_verification(tracker, store, &ordered).await?;
        report.completed_stages.push(SyncStage::WireDependencies);

        enter(SyncStage::ReconcileStatuses);
        report.statuses = reconcile_statuses(tracker, store, &ordered, status_names).await?;
        report.completed_stages.push(SyncStage::ReconcileStatuses);

        match persist_path {
            Some(path) => {
                enter(SyncStage::PersistStore);
                store.save(&*path)?;
                info!(path = ?path, "mapping persisted");
                report.completed_stages.push(SyncStage::PersistStore);
            }
            None => skip(&mut report, SyncStage::PersistStore, "no mapping path"),
        }

        report.summary = store.summary();
        Ok(report)
    }

    async fn ensure_initialized(&mut self) -> Result<()> {
        let ready = self
            .tracker
            .check_initialized()
            .await
            .map_err(|source| SyncError::External {
                operation: TrackerOp::CheckInitialized,
                entity: "workspace".to_string(),
                source,
            })?;
        if ready {
            Ok(())
        } else {
            Err(SyncError::TrackerNotInitialized)
        }
    }
}

fn enter(stage: SyncStage) {
    info!(stage = %stage, "entering stage");
}

fn skip(report: &mut SyncReport, stage: SyncStage, reason: &str) {
    info!(stage = %stage, reason, "skipping stage");
    report.skipped_stages.push(stage);
}

fn stage_progress(
    progress: &mut Option<StageProgress>,
    stage: SyncStage,
) -> impl FnMut(usize, usize) + Send + '_ {
    move |done, total| {
        debug!(stage = %stage, done, total, "progress");
        if let Some(cb) = progress.as_mut() {
            cb(stage, done, total);
        }
    }
}
