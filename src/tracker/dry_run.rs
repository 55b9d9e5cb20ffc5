// src/tracker/dry_run.rs

//! Tracker that prints planned operations instead of performing them.

use tracing::debug;

use crate::tracker::{CreateIssue, CreatedIssue, IssueTracker, TrackerFuture};

/// Prints each operation to stdout and hands back synthetic ids
/// (`dry-run-1`, `dry-run-2`, ...), so the full pipeline can run without
/// touching the tracker.
#[derive(Debug, Default)]
pub struct DryRunTracker {
    next_id: usize,
    operations: usize,
}

impl DryRunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations that would have been sent to the tracker.
    pub fn operations(&self) -> usize {
        self.operations
    }

    fn record(&mut self, line: String) {
        self.operations += 1;
        println!("  [dry-run] {line}");
    }
}

impl IssueTracker for DryRunTracker {
    fn create(&mut self, request: CreateIssue) -> TrackerFuture<'_, CreatedIssue> {
        self.next_id += 1;
        let id = format!("dry-run-{}", self.next_id);

        let mut line = format!("create {} {:?} -> {id}", request.kind.as_str(), request.title);
        if let Some(parent) = &request.parent {
            line.push_str(&format!(" (parent {parent})"));
        }
        if let Some(priority) = request.priority {
            line.push_str(&format!(" (priority {priority})"));
        }
        self.record(line);

        Box::pin(async move {
            Ok(CreatedIssue {
                id,
                title: request.title,
                kind: request.kind,
            })
        })
    }

    fn add_dependency(&mut self, blocked: &str, blocking: &str) -> TrackerFuture<'_, ()> {
        self.record(format!("dep add {blocked} blocked-by {blocking}"));
        Box::pin(async { Ok(()) })
    }

    fn update_status(&mut self, id: &str, status: &str) -> TrackerFuture<'_, ()> {
        self.record(format!("update {id} --status {status}"));
        Box::pin(async { Ok(()) })
    }

    fn close(&mut self, id: &str) -> TrackerFuture<'_, ()> {
        self.record(format!("close {id}"));
        Box::pin(async { Ok(()) })
    }

    fn check_initialized(&mut self) -> TrackerFuture<'_, bool> {
        debug!("dry-run: skipping tracker initialization check");
        Box::pin(async { Ok(true) })
    }
}
