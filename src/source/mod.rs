// src/source/mod.rs

//! The source task list.
//!
//! Responsibilities:
//! - Define the task/subtask data model (`model.rs`).
//! - Read a Task Master `tasks.json` file from disk (`loader.rs`).
//! - Coerce and validate the raw document into a [`TaskList`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{TaskSource, load_task_list, load_task_source, parse_task_list, source_digest};
pub use model::{Priority, RawTaskList, Subtask, Task, TaskList, TaskStatus};
