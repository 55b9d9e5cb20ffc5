// src/source/loader.rs

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SyncError};
use crate::source::model::{RawTaskList, TaskList};

/// A validated task list together with the digest of the bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct TaskSource {
    pub tasks: TaskList,
    pub digest: String,
}

/// Read the task file once, validate it and hash the same contents.
///
/// `tag` selects the tagged section (`{"master": {"tasks": [...]}}`); it is
/// ignored for files in the legacy `{"tasks": [...]}` layout.
pub fn load_task_source(path: impl AsRef<Path>, tag: &str) -> Result<TaskSource> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| SyncError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let tasks = parse_task_list(&contents, tag).map_err(|e| match e {
        SyncError::JsonError(json) => SyncError::Load {
            path: path.to_path_buf(),
            reason: json.to_string(),
        },
        other => other,
    })?;

    Ok(TaskSource {
        tasks,
        digest: source_digest(contents.as_bytes()),
    })
}

/// Load and validate a task list from disk.
pub fn load_task_list(path: impl AsRef<Path>, tag: &str) -> Result<TaskList> {
    Ok(load_task_source(path, tag)?.tasks)
}

/// Parse and validate a task list from a JSON string.
///
/// Text that is not JSON is a [`SyncError::JsonError`]; JSON that does not
/// describe a task list is a [`SyncError::Validation`].
pub fn parse_task_list(json: &str, tag: &str) -> Result<TaskList> {
    let doc: Value = serde_json::from_str(json)?;

    let section = if doc.get("tasks").is_some_and(Value::is_array) {
        debug!("task file uses the legacy untagged layout");
        doc
    } else {
        match doc.get(tag) {
            Some(section) => {
                debug!(tag, "task file uses the tagged layout");
                section.clone()
            }
            None => {
                let available = doc
                    .as_object()
                    .map(|o| o.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                return Err(SyncError::Validation(format!(
                    "tag '{tag}' not found in task file (available: {available})"
                )));
            }
        }
    };

    let raw: RawTaskList = serde_json::from_value(section)
        .map_err(|e| SyncError::Validation(format!("malformed task data: {e}")))?;
    TaskList::try_from(raw)
}

/// blake3 digest of the source file contents, recorded in the mapping
/// document so a resumed run can tell whether the task list changed in between.
pub fn source_digest(contents: &[u8]) -> String {
    blake3::hash(contents).to_hex().to_string()
}
