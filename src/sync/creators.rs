// src/sync/creators.rs

//! Issue creation for the three entity kinds.
//!
//! Each creator turns source entities into `create` calls and registers the
//! returned ids in the [`MappingStore`]. Entities that already have a mapping
//! (from a resumed run) are skipped, so re-running never creates duplicates.

use tracing::{debug, info};

use crate::errors::{Result, SyncError};
use crate::mapping::MappingStore;
use crate::source::{Priority, Subtask, Task};
use crate::sync::{ProgressFn, report_progress};
use crate::tracker::{CreateIssue, IssueKind, IssueTracker, TrackerOp};

/// Outcome counts for one creation stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCount {
    pub created: usize,
    /// Already mapped before this run.
    pub skipped: usize,
}

/// Tracker priority ordinal: lower is more urgent.
pub fn target_priority(priority: Priority) -> u8 {
    match priority {
        Priority::High => 0,
        Priority::Medium => 1,
        Priority::Low => 2,
    }
}

/// Body of a top-level issue: description, implementation details, test
/// strategy, then a metadata footer pointing back at the source task.
pub fn format_task_body(task: &Task) -> String {
    let mut body = task.description.trim().to_string();
    push_section(&mut body, "Implementation Details", task.details.as_deref());
    push_section(&mut body, "Test Strategy", task.test_strategy.as_deref());

    let mut footer = format!("---\nSource task: {}", task.id);
    if let Some(complexity) = task.complexity {
        footer.push_str(&format!("\nComplexity: {complexity}/10"));
    }
    footer.push_str(&format!("\nOriginal status: {}", task.status));
    push_block(&mut body, &footer);
    body
}

pub fn format_subtask_body(subtask: &Subtask) -> String {
    let mut body = subtask.description.trim().to_string();
    push_section(&mut body, "Implementation Details", subtask.details.as_deref());
    body
}

pub fn format_verification_body(test_strategy: &str) -> String {
    format!("## Test Strategy\n\n{}", test_strategy.trim())
}

pub fn verification_title(task: &Task) -> String {
    format!("Verify: {}", task.title)
}

fn push_section(body: &mut String, heading: &str, text: Option<&str>) {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        push_block(body, &format!("## {heading}\n\n{text}"));
    }
}

fn push_block(body: &mut String, block: &str) {
    if !body.is_empty() {
        body.push_str("\n\n");
    }
    body.push_str(block);
}

/// Create one epic per task, in the given (resolved) order.
pub async fn create_top_level<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
    mut progress: Option<ProgressFn<'_>>,
) -> Result<StageCount> {
    let total = ordered
        .iter()
        .filter(|t| store.top_level(t.id).is_none())
        .count();
    let mut count = StageCount::default();

    for task in ordered {
        if let Some(existing) = store.top_level(task.id) {
            debug!(task = task.id, target = %existing, "task already created; skipping");
            count.skipped += 1;
        } else {
            let request = CreateIssue {
                title: task.title.clone(),
                description: Some(format_task_body(task)),
                kind: IssueKind::Epic,
                parent: None,
                priority: Some(target_priority(task.priority)),
            };
            let created = tracker
                .create(request)
                .await
                .map_err(|source| SyncError::External {
                    operation: TrackerOp::Create,
                    entity: format!("task {}", task.id),
                    source,
                })?;
            info!(task = task.id, target = %created.id, "created epic");
            store.register_top_level(task.id, created.id)?;
            store.checkpoint()?;
            count.created += 1;
            report_progress(&mut progress, count.created, total);
        }
    }

    Ok(count)
}

/// Create one child issue per subtask, by ascending subtask id within each
/// parent. Every parent must already have a top-level mapping.
pub async fn create_children<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
    mut progress: Option<ProgressFn<'_>>,
) -> Result<StageCount> {
    let total = ordered
        .iter()
        .flat_map(|t| t.subtasks.iter().map(move |s| (t.id, s.id)))
        .filter(|(parent, child)| store.child(*parent, *child).is_none())
        .count();
    let mut count = StageCount::default();

    for task in ordered.iter().filter(|t| !t.subtasks.is_empty()) {
        let parent = store
            .top_level(task.id)
            .ok_or_else(|| SyncError::missing_parent(task.id))?
            .to_string();

        for subtask in task.subtasks_by_id() {
            if let Some(existing) = store.child(task.id, subtask.id) {
                debug!(task = task.id, subtask = subtask.id, target = %existing, "subtask already created; skipping");
                count.skipped += 1;
            } else {
                let request = CreateIssue {
                    title: subtask.title.clone(),
                    description: Some(format_subtask_body(subtask)),
                    kind: IssueKind::Task,
                    parent: Some(parent.clone()),
                    priority: None,
                };
                let created = tracker
                    .create(request)
                    .await
                    .map_err(|source| SyncError::External {
                        operation: TrackerOp::Create,
                        entity: format!("subtask {}.{}", task.id, subtask.id),
                        source,
                    })?;
                info!(task = task.id, subtask = subtask.id, target = %created.id, "created child issue");
                store.register_child(task.id, subtask.id, created.id)?;
                store.checkpoint()?;
                count.created += 1;
                report_progress(&mut progress, count.created, total);
            }
        }
    }

    Ok(count)
}

/// Create a verification child for every task with a non-empty test strategy.
pub async fn create_verification_items<T: IssueTracker + ?Sized>(
    tracker: &mut T,
    store: &mut MappingStore,
    ordered: &[&Task],
    mut progress: Option<ProgressFn<'_>>,
) -> Result<StageCount> {
    let candidates: Vec<&Task> = ordered
        .iter()
        .copied()
        .filter(|t| t.has_test_strategy())
        .collect();
    let total = candidates
        .iter()
        .filter(|t| store.verification(t.id).is_none())
        .count();
    let mut count = StageCount::default();

    for task in candidates {
        let parent = store
            .top_level(task.id)
            .ok_or_else(|| SyncError::missing_parent(task.id))?
            .to_string();

        if let Some(existing) = store.verification(task.id) {
            debug!(task = task.id, target = %existing, "verification item already created; skipping");
            count.skipped += 1;
        } else {
            let strategy = task.test_strategy.as_deref().unwrap_or_default();
            let request = CreateIssue {
                title: verification_title(task),
                description: Some(format_verification_body(strategy)),
                kind: IssueKind::Task,
                parent: Some(parent),
                priority: None,
            };
            let created = tracker
                .create(request)
                .await
                .map_err(|source| SyncError::External {
                    operation: TrackerOp::Create,
                    entity: format!("verification item of task {}", task.id),
                    source,
                })?;
            info!(task = task.id, target = %created.id, "created verification item");
            store.register_verification(task.id, created.id)?;
            store.checkpoint()?;
            count.created += 1;
            report_progress(&mut progress, count.created, total);
        }
    }

    Ok(count)
}
