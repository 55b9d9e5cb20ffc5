// src/source/validate.rs

use std::collections::HashSet;

use crate::errors::{Result, SyncError};
use crate::source::model::{RawId, RawSubtask, RawTask, RawTaskList, Subtask, Task, TaskList};

impl TryFrom<RawTaskList> for TaskList {
    type Error = SyncError;

    fn try_from(raw: RawTaskList) -> std::result::Result<Self, Self::Error> {
        let tasks = raw
            .tasks
            .into_iter()
            .map(coerce_task)
            .collect::<Result<Vec<_>>>()?;
        TaskList::new(tasks)
    }
}

impl TaskList {
    /// Validate an already-typed list of tasks.
    ///
    /// This checks:
    /// - task ids are positive and unique
    /// - subtask ids are positive and unique within their parent
    /// - titles are non-empty
    /// - complexity scores are within `1..=10`
    /// - no dependency id is listed twice
    ///
    /// It does **not** check that dependencies resolve or that the graph is
    /// acyclic; the resolver reports those as graph errors.
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        let mut seen = HashSet::new();
        for task in &tasks {
            if task.id == 0 {
                return Err(validation("task ids must be positive integers (got 0)"));
            }
            if !seen.insert(task.id) {
                return Err(validation(format!("duplicate task id {}", task.id)));
            }
            validate_task(task)?;
        }
        Ok(TaskList::new_unchecked(tasks))
    }
}

fn validate_task(task: &Task) -> Result<()> {
    if task.title.trim().is_empty() {
        return Err(validation(format!("task {} has an empty title", task.id)));
    }
    if let Some(c) = task.complexity {
        if !(1..=10).contains(&c) {
            return Err(validation(format!(
                "task {} has complexity {c}, expected 1..=10",
                task.id
            )));
        }
    }
    ensure_no_duplicate_deps(&task.dependencies, || format!("task {}", task.id))?;

    let mut seen = HashSet::new();
    for subtask in &task.subtasks {
        if subtask.id == 0 {
            return Err(validation(format!(
                "task {} has a subtask with id 0",
                task.id
            )));
        }
        if !seen.insert(subtask.id) {
            return Err(validation(format!(
                "task {} has duplicate subtask id {}",
                task.id, subtask.id
            )));
        }
        if subtask.title.trim().is_empty() {
            return Err(validation(format!(
                "subtask {}.{} has an empty title",
                task.id, subtask.id
            )));
        }
        ensure_no_duplicate_deps(&subtask.dependencies, || {
            format!("subtask {}.{}", task.id, subtask.id)
        })?;
    }
    Ok(())
}

fn ensure_no_duplicate_deps(deps: &[u32], owner: impl Fn() -> String) -> Result<()> {
    let mut seen = HashSet::new();
    for dep in deps {
        if !seen.insert(*dep) {
            return Err(validation(format!(
                "{} lists dependency {dep} more than once",
                owner()
            )));
        }
    }
    Ok(())
}

fn coerce_task(raw: RawTask) -> Result<Task> {
    let id = coerce_id(&raw.id).ok_or_else(|| {
        validation(format!("task id {} is not a positive integer", raw.id))
    })?;

    let dependencies = raw
        .dependencies
        .unwrap_or_default()
        .iter()
        .map(|dep| {
            coerce_id(dep).ok_or_else(|| {
                validation(format!("task {id} has invalid dependency {dep}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let complexity = match raw.complexity {
        None => None,
        Some(c) => Some(u8::try_from(c).map_err(|_| {
            validation(format!("task {id} has complexity {c}, expected 1..=10"))
        })?),
    };

    let subtasks = raw
        .subtasks
        .unwrap_or_default()
        .into_iter()
        .map(|s| coerce_subtask(id, s))
        .collect::<Result<Vec<_>>>()?;

    Ok(Task {
        id,
        title: raw.title,
        description: raw.description.unwrap_or_default(),
        status: raw.status.unwrap_or_default(),
        priority: raw.priority.unwrap_or_default(),
        dependencies,
        complexity,
        details: non_empty(raw.details),
        test_strategy: non_empty(raw.test_strategy),
        subtasks,
    })
}

fn coerce_subtask(parent: u32, raw: RawSubtask) -> Result<Subtask> {
    let id = coerce_id(&raw.id).ok_or_else(|| {
        validation(format!(
            "task {parent} has a subtask id {} that is not a positive integer",
            raw.id
        ))
    })?;

    let dependencies = raw
        .dependencies
        .unwrap_or_default()
        .iter()
        .map(|dep| {
            coerce_sibling_id(parent, dep).ok_or_else(|| {
                validation(format!(
                    "subtask {parent}.{id} has invalid sibling dependency {dep}"
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Subtask {
        id,
        title: raw.title,
        description: raw.description.unwrap_or_default(),
        status: raw.status.unwrap_or_default(),
        dependencies,
        details: non_empty(raw.details),
    })
}

fn coerce_id(raw: &RawId) -> Option<u32> {
    match raw {
        RawId::Number(n) => u32::try_from(*n).ok(),
        RawId::Text(s) => s.trim().parse::<u32>().ok(),
    }
}

/// Like [`coerce_id`], but also accepts the dotted `"<parent>.<child>"` form
/// when `<parent>` is the subtask's own parent.
fn coerce_sibling_id(parent: u32, raw: &RawId) -> Option<u32> {
    if let RawId::Text(s) = raw {
        if let Some((p, c)) = s.trim().split_once('.') {
            return match p.parse::<u32>() {
                Ok(p) if p == parent => c.parse::<u32>().ok(),
                _ => None,
            };
        }
    }
    coerce_id(raw)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn validation(msg: impl Into<String>) -> SyncError {
    SyncError::Validation(msg.into())
}
