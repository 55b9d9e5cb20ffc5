// src/source/model.rs

use std::fmt;

use serde::Deserialize;

use crate::dag::DependencyNode;

/// Status of a task or subtask in the source list.
///
/// Values outside the four known ones are preserved verbatim in `Unknown` so
/// newer task files still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Deferred,
    Unknown(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Deferred => "deferred",
            TaskStatus::Unknown(other) => other.as_str(),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "in-progress" | "in_progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "deferred" => TaskStatus::Deferred,
            _ => TaskStatus::Unknown(s.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::from(s.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// A top-level task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Ids of other tasks in the same list, in declaration order.
    pub dependencies: Vec<u32>,
    /// Complexity score in `1..=10`.
    pub complexity: Option<u8>,
    /// Implementation notes.
    pub details: Option<String>,
    pub test_strategy: Option<String>,
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Whether a verification item should be created for this task.
    pub fn has_test_strategy(&self) -> bool {
        self.test_strategy
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Subtasks ordered by ascending id, independent of file order.
    pub fn subtasks_by_id(&self) -> Vec<&Subtask> {
        let mut subtasks: Vec<&Subtask> = self.subtasks.iter().collect();
        subtasks.sort_by_key(|s| s.id);
        subtasks
    }
}

/// A subtask. Its id is only unique within the parent task, and its
/// dependencies refer to sibling subtasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub dependencies: Vec<u32>,
    pub details: Option<String>,
}

impl DependencyNode for Task {
    fn node_id(&self) -> u32 {
        self.id
    }

    fn dependency_ids(&self) -> &[u32] {
        &self.dependencies
    }
}

impl DependencyNode for Subtask {
    fn node_id(&self) -> u32 {
        self.id
    }

    fn dependency_ids(&self) -> &[u32] {
        &self.dependencies
    }
}

/// Validated task list.
///
/// Only constructible through [`TaskList::new`] or `TryFrom<RawTaskList>`,
/// both of which run validation (see `validate.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub(crate) fn new_unchecked(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn subtask_count(&self) -> usize {
        self.tasks.iter().map(|t| t.subtasks.len()).sum()
    }

    pub fn test_strategy_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.has_test_strategy()).count()
    }
}

/// An id or dependency reference as it appears in the JSON file.
///
/// Task Master writes numbers, but hand-edited files often contain numeric
/// strings, and subtask dependencies may use the dotted `"<parent>.<child>"`
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Task list exactly as deserialized, before coercion and validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTaskList {
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: RawId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub dependencies: Option<Vec<RawId>>,
    #[serde(default)]
    pub complexity: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub test_strategy: Option<String>,
    #[serde(default)]
    pub subtasks: Option<Vec<RawSubtask>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubtask {
    pub id: RawId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub dependencies: Option<Vec<RawId>>,
    #[serde(default)]
    pub details: Option<String>,
}
