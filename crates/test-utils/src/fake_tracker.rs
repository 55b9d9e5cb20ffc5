use std::sync::{Arc, Mutex};

use tm2bd::tracker::{
    CreateIssue, CreatedIssue, IssueKind, IssueTracker, TrackerError, TrackerFuture,
};

/// One call the pipeline made against the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    Create {
        /// Id handed back to the caller.
        id: String,
        title: String,
        description: Option<String>,
        kind: IssueKind,
        parent: Option<String>,
        priority: Option<u8>,
    },
    AddDependency {
        blocked: String,
        blocking: String,
    },
    UpdateStatus {
        id: String,
        status: String,
    },
    Close {
        id: String,
    },
    CheckInitialized,
}

/// A fake tracker that:
/// - records every call in order
/// - hands out sequential ids (`bd-1`, `bd-2`, ...)
/// - can be told to reject a given create or to report an uninitialized workspace.
pub struct FakeTracker {
    calls: Arc<Mutex<Vec<TrackerCall>>>,
    next_id: usize,
    initialized: bool,
    fail_create_titled: Option<String>,
}

impl FakeTracker {
    pub fn new(calls: Arc<Mutex<Vec<TrackerCall>>>) -> Self {
        Self {
            calls,
            next_id: 0,
            initialized: true,
            fail_create_titled: None,
        }
    }

    /// Continue numbering after `n` ids, as if they had been handed out by an
    /// earlier run.
    pub fn starting_after(mut self, n: usize) -> Self {
        self.next_id = n;
        self
    }

    pub fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }

    /// Reject `create` for the issue with this exact title.
    pub fn failing_create(mut self, title: &str) -> Self {
        self.fail_create_titled = Some(title.to_string());
        self
    }

    fn record(&self, call: TrackerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl IssueTracker for FakeTracker {
    fn create(&mut self, request: CreateIssue) -> TrackerFuture<'_, CreatedIssue> {
        if self.fail_create_titled.as_deref() == Some(request.title.as_str()) {
            let title = request.title.clone();
            return Box::pin(async move {
                Err(TrackerError::Rejected(format!("refusing to create {title:?}")))
            });
        }

        self.next_id += 1;
        let id = format!("bd-{}", self.next_id);
        self.record(TrackerCall::Create {
            id: id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            kind: request.kind,
            parent: request.parent.clone(),
            priority: request.priority,
        });

        Box::pin(async move {
            Ok(CreatedIssue {
                id,
                title: request.title,
                kind: request.kind,
            })
        })
    }

    fn add_dependency(&mut self, blocked: &str, blocking: &str) -> TrackerFuture<'_, ()> {
        self.record(TrackerCall::AddDependency {
            blocked: blocked.to_string(),
            blocking: blocking.to_string(),
        });
        Box::pin(async { Ok(()) })
    }

    fn update_status(&mut self, id: &str, status: &str) -> TrackerFuture<'_, ()> {
        self.record(TrackerCall::UpdateStatus {
            id: id.to_string(),
            status: status.to_string(),
        });
        Box::pin(async { Ok(()) })
    }

    fn close(&mut self, id: &str) -> TrackerFuture<'_, ()> {
        self.record(TrackerCall::Close { id: id.to_string() });
        Box::pin(async { Ok(()) })
    }

    fn check_initialized(&mut self) -> TrackerFuture<'_, bool> {
        self.record(TrackerCall::CheckInitialized);
        let initialized = self.initialized;
        Box::pin(async move { Ok(initialized) })
    }
}

/// Titles of all `create` calls, in order.
pub fn created_titles(calls: &[TrackerCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|c| match c {
            TrackerCall::Create { title, .. } => Some(title.clone()),
            _ => None,
        })
        .collect()
}

/// `(blocked, blocking)` pairs of all `add_dependency` calls, in order.
pub fn dependency_calls(calls: &[TrackerCall]) -> Vec<(String, String)> {
    calls
        .iter()
        .filter_map(|c| match c {
            TrackerCall::AddDependency { blocked, blocking } => {
                Some((blocked.clone(), blocking.clone()))
            }
            _ => None,
        })
        .collect()
}
