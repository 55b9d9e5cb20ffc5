// src/tracker/mod.rs

//! The external issue tracker, seen through a narrow command contract.
//!
//! The sync pipeline only talks to an [`IssueTracker`]. This keeps the
//! process-spawning backend out of the core and lets tests substitute a
//! recording fake.
//!
//! - [`bd`] provides [`BdTracker`], which shells out to the `bd` binary.
//! - [`dry_run`] provides [`DryRunTracker`], which only prints what it would do.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bd;
pub mod dry_run;

pub use bd::BdTracker;
pub use dry_run::DryRunTracker;

/// Boxed future returned by every tracker operation.
pub type TrackerFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, TrackerError>> + Send + 'a>>;

/// Kind of issue created in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Top-level issue for a source task.
    Epic,
    /// Child issue for a subtask or verification item.
    Task,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Epic => "epic",
            IssueKind::Task => "task",
        }
    }
}

/// Arguments of a `create` call. `parent` present means a child issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssue {
    pub title: String,
    pub description: Option<String>,
    pub kind: IssueKind,
    pub parent: Option<String>,
    /// Tracker priority ordinal; lower is more urgent.
    pub priority: Option<u8>,
}

/// Result of a successful `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub id: String,
    pub title: String,
    pub kind: IssueKind,
}

/// Which tracker operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOp {
    Create,
    AddDependency,
    UpdateStatus,
    Close,
    CheckInitialized,
}

impl fmt::Display for TrackerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerOp::Create => "create",
            TrackerOp::AddDependency => "add-dependency",
            TrackerOp::UpdateStatus => "update-status",
            TrackerOp::Close => "close",
            TrackerOp::CheckInitialized => "check-initialized",
        };
        f.write_str(name)
    }
}

/// Transport-level failure of a tracker call. Never retried.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code}: {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("unexpected output from `{command}`: {reason}")]
    Output { command: String, reason: String },

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Operations the sync pipeline needs from the issue tracker.
///
/// Calls are issued strictly one at a time; implementations need not be
/// safe for concurrent use.
pub trait IssueTracker: Send {
    /// Create a top-level issue, or a child when `request.parent` is set.
    fn create(&mut self, request: CreateIssue) -> TrackerFuture<'_, CreatedIssue>;

    /// Record that `blocked` cannot proceed until `blocking` is resolved.
    fn add_dependency(&mut self, blocked: &str, blocking: &str) -> TrackerFuture<'_, ()>;

    /// Set a non-closing status.
    fn update_status(&mut self, id: &str, status: &str) -> TrackerFuture<'_, ()>;

    fn close(&mut self, id: &str) -> TrackerFuture<'_, ()>;

    /// Whether the tracker is ready to accept writes.
    fn check_initialized(&mut self) -> TrackerFuture<'_, bool>;
}
