// src/sync/mod.rs

//! The sync pipeline.
//!
//! - [`creators`] create tracker issues for tasks, subtasks and test strategies.
//! - [`wiring`] replays source dependencies as blocked-by relationships.
//! - [`status`] maps source statuses to tracker status changes.
//! - [`orchestrator`] sequences the stages and owns the mapping store for the run.
//!
//! All tracker calls are issued one at a time, in a fixed order: an issue must
//! exist before anything can reference it.

use std::fmt;

pub mod creators;
pub mod orchestrator;
pub mod status;
pub mod wiring;

pub use creators::{
    StageCount, create_children, create_top_level, create_verification_items, format_subtask_body,
    format_task_body, format_verification_body, target_priority, verification_title,
};
pub use orchestrator::{RunMode, SyncOrchestrator, SyncReport};
pub use status::{StatusAction, StatusCount, StatusNames, TargetStatus, reconcile_statuses, status_action};
pub use wiring::{wire_children, wire_top_level, wire_verification};

/// Per-stage progress callback: `(created, total)`, called after each
/// successful creation.
///
/// `total` is computed once before the stage starts and counts only the
/// entities that still lack a mapping, so resumed runs also end at
/// `created == total`.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(usize, usize) + Send);

pub(crate) fn report_progress(progress: &mut Option<ProgressFn<'_>>, done: usize, total: usize) {
    if let Some(cb) = progress {
        cb(done, total);
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncStage {
    ResolveOrder,
    CreateTopLevel,
    CreateChildren,
    CreateVerificationItems,
    WireDependencies,
    ReconcileStatuses,
    PersistStore,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::ResolveOrder => "resolve-order",
            SyncStage::CreateTopLevel => "create-top-level",
            SyncStage::CreateChildren => "create-children",
            SyncStage::CreateVerificationItems => "create-verification-items",
            SyncStage::WireDependencies => "wire-dependencies",
            SyncStage::ReconcileStatuses => "reconcile-statuses",
            SyncStage::PersistStore => "persist-store",
        };
        f.write_str(name)
    }
}
