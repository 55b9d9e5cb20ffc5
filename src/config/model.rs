// src/config/model.rs

use serde::Deserialize;

use crate::sync::StatusNames;

/// Settings as read from `tm2bd.toml`.
///
/// ```toml
/// [tracker]
/// binary = "bd"
/// in_progress_status = "in_progress"
/// deferred_status = "deferred"
///
/// [sync]
/// tag = "master"
/// tasks_file = ".taskmaster/tasks/tasks.json"
/// mapping_file = "tm2bd-mapping.json"
/// ```
///
/// All sections and keys are optional. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tracker: TrackerSection,

    #[serde(default)]
    pub sync: SyncSection,
}

/// `[tracker]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackerSection {
    /// Name or path of the `bd` executable.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Status set for tasks that are in progress.
    #[serde(default = "default_in_progress_status")]
    pub in_progress_status: String,

    /// Status set for deferred tasks.
    #[serde(default = "default_deferred_status")]
    pub deferred_status: String,
}

fn default_binary() -> String {
    "bd".to_string()
}

fn default_in_progress_status() -> String {
    StatusNames::default().in_progress
}

fn default_deferred_status() -> String {
    StatusNames::default().deferred
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            in_progress_status: default_in_progress_status(),
            deferred_status: default_deferred_status(),
        }
    }
}

impl TrackerSection {
    pub fn status_names(&self) -> StatusNames {
        StatusNames {
            in_progress: self.in_progress_status.clone(),
            deferred: self.deferred_status.clone(),
        }
    }
}

/// `[sync]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncSection {
    /// Tag to read from a tagged task file.
    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    #[serde(default = "default_mapping_file")]
    pub mapping_file: String,
}

fn default_tag() -> String {
    "master".to_string()
}

fn default_tasks_file() -> String {
    ".taskmaster/tasks/tasks.json".to_string()
}

fn default_mapping_file() -> String {
    "tm2bd-mapping.json".to_string()
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            tasks_file: default_tasks_file(),
            mapping_file: default_mapping_file(),
        }
    }
}
