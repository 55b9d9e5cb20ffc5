// src/sync/wiring.rs

//! Blocked-by wiring.
//!
//! Runs after all creation stages, in three passes: top-level issues, child
//! issues (scoped to their parent), then verification items. Source ids are
//! resolved through the [`MappingStore`]; an unresolved id on either side is
//! fatal. Edges already recorded in the store are not sent again.

use tracing::{debug, info};

use crate::errors::{Result, SyncError};
use crate::mapping::MappingStore;
use crate::source::Task;
use crate::tracker::{IssueTracker, TrackerOp};

async fn add_edge<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    blocked: &str,
    blocking: &str,
    entity: impl FnOnce() -> String,
) -> Result<bool> {
    if store.has_edge(blocked, blocking) {
        debug!(blocked, blocking, "dependency already wired; skipping");
        return Ok(false);
    }
    tracker
        .add_dependency(blocked, blocking)
        .await
        .map_err(|source| SyncError::External {
            operation: TrackerOp::AddDependency,
            entity: entity(),
            source,
        })?;
    store.record_edge(blocked, blocking);
    store.checkpoint()?;
    Ok(true)
}

/// Wire every task as blocked by each of its dependencies.
///
/// Returns the number of new edges.
pub async fn wire_top_level<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
) -> Result<usize> {
    let mut wired = 0;

    for task in ordered.iter().filter(|t| !t.dependencies.is_empty()) {
        let blocked = store
            .top_level(task.id)
            .ok_or_else(|| {
                SyncError::MissingMapping(format!("blocked side: task {} was never created", task.id))
            })?
            .to_string();

        for dep in &task.dependencies {
            let blocking = store
                .top_level(*dep)
                .ok_or_else(|| {
                    SyncError::MissingMapping(format!(
                        "blocking side: task {dep} (dependency of task {}) was never created",
                        task.id
                    ))
                })?
                .to_string();

            if add_edge(tracker, store, &blocked, &blocking, || {
                format!("task {} blocked by task {dep}", task.id)
            })
            .await?
            {
                wired += 1;
            }
        }
    }

    info!(edges = wired, "wired task dependencies");
    Ok(wired)
}

/// Wire subtasks as blocked by their sibling dependencies.
///
/// Returns the number of new edges.
pub async fn wire_children<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
) -> Result<usize> {
    let mut wired = 0;

    for task in ordered {
        for subtask in task
            .subtasks_by_id()
            .into_iter()
            .filter(|s| !s.dependencies.is_empty())
        {
            let blocked = store
                .child(task.id, subtask.id)
                .ok_or_else(|| {
                    SyncError::MissingMapping(format!(
                        "blocked side: subtask {}.{} was never created",
                        task.id, subtask.id
                    ))
                })?
                .to_string();

            for dep in &subtask.dependencies {
                let blocking = store
                    .child(task.id, *dep)
                    .ok_or_else(|| {
                        SyncError::MissingMapping(format!(
                            "blocking side: subtask {}.{dep} (dependency of subtask {}.{}) was never created",
                            task.id, task.id, subtask.id
                        ))
                    })?
                    .to_string();

                if add_edge(tracker, store, &blocked, &blocking, || {
                    format!("subtask {}.{} blocked by subtask {}.{dep}", task.id, subtask.id, task.id)
                })
                .await?
                {
                    wired += 1;
                }
            }
        }
    }

    info!(edges = wired, "wired subtask dependencies");
    Ok(wired)
}

/// Wire each verification item as blocked by every child of its task, so
/// verification only becomes ready once all subtask work is done.
///
/// Tasks lacking a verification item or children are skipped. Returns the
/// number of new edges.
pub async fn wire_verification<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
) -> Result<usize> {
    let mut wired = 0;

    for task in ordered {
        let Some(verification) = store.verification(task.id).map(str::to_string) else {
            continue;
        };
        let children: Vec<(u32, String)> = store
            .children_of(task.id)
            .map(|(id, target)| (id, target.to_string()))
            .collect();
        if children.is_empty() {
            continue;
        }

        for (subtask, child) in children {
            if add_edge(tracker, store, &verification, &child, || {
                format!("verification item of task {} blocked by subtask {}.{subtask}", task.id, task.id)
            })
            .await?
            {
                wired += 1;
            }
        }
    }

    info!(edges = wired, "wired verification items");
    Ok(wired)
}
