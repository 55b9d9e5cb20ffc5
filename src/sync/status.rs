// src/sync/status.rs

//! Source status -> tracker action.

use tracing::{debug, info};

use crate::errors::{Result, SyncError};
use crate::mapping::MappingStore;
use crate::source::{Task, TaskStatus};
use crate::tracker::{IssueTracker, TrackerOp};

/// Non-closing tracker statuses the reconciler may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    InProgress,
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    None,
    Update(TargetStatus),
    Close,
}

/// The fixed status mapping. Unknown statuses map to no action.
pub fn status_action(status: &TaskStatus) -> StatusAction {
    match status {
        TaskStatus::Pending => StatusAction::None,
        TaskStatus::InProgress => StatusAction::Update(TargetStatus::InProgress),
        TaskStatus::Done => StatusAction::Close,
        TaskStatus::Deferred => StatusAction::Update(TargetStatus::Deferred),
        TaskStatus::Unknown(_) => StatusAction::None,
    }
}

/// Status names as the tracker spells them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNames {
    pub in_progress: String,
    pub deferred: String,
}

impl Default for StatusNames {
    fn default() -> Self {
        Self {
            in_progress: "in_progress".to_string(),
            deferred: "deferred".to_string(),
        }
    }
}

impl StatusNames {
    pub fn name_of(&self, status: TargetStatus) -> &str {
        match status {
            TargetStatus::InProgress => &self.in_progress,
            TargetStatus::Deferred => &self.deferred,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCount {
    pub updated: usize,
    pub closed: usize,
}

async fn apply<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    names: &StatusNames,
    id: &str,
    status: &TaskStatus,
    entity: String,
    count: &mut StatusCount,
) -> Result<()> {
    match status_action(status) {
        StatusAction::None => {
            debug!(entity = %entity, status = %status, "no status change needed");
        }
        StatusAction::Update(target) => {
            let name = names.name_of(target);
            tracker
                .update_status(id, name)
                .await
                .map_err(|source| SyncError::External {
                    operation: TrackerOp::UpdateStatus,
                    entity: entity.clone(),
                    source,
                })?;
            debug!(entity = %entity, target = %id, status = name, "updated status");
            count.updated += 1;
        }
        StatusAction::Close => {
            tracker.close(id).await.map_err(|source| SyncError::External {
                operation: TrackerOp::Close,
                entity: entity.clone(),
                source,
            })?;
            debug!(entity = %entity, target = %id, "closed");
            count.closed += 1;
        }
    }
    Ok(())
}

/// Apply status actions to every task, then to every subtask that has a
/// mapping. Subtasks without one are skipped.
pub async fn reconcile_statuses<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &MappingStore,
    ordered: &[&Task],
    names: &StatusNames,
) -> Result<StatusCount> {
    let mut count = StatusCount::default();

    for task in ordered {
        let id = store.top_level(task.id).ok_or_else(|| {
            SyncError::MissingMapping(format!("task {} was never created", task.id))
        })?;
        apply(tracker, names, id, &task.status, format!("task {}", task.id), &mut count).await?;
    }

    for task in ordered {
        for subtask in task.subtasks_by_id() {
            let Some(id) = store.child(task.id, subtask.id) else {
                debug!(task = task.id, subtask = subtask.id, "subtask has no mapping; skipping status");
                continue;
            };
            apply(
                tracker,
                names,
                id,
                &subtask.status,
                format!("subtask {}.{}", task.id, subtask.id),
                &mut count,
            )
            .await?;
        }
    }

    info!(updated = count.updated, closed = count.closed, "reconciled statuses");
    Ok(count)
}
