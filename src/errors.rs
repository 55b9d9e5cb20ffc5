// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::dag::GraphError;
use crate::tracker::{TrackerError, TrackerOp};

#[derive(Error, Debug)]
pub enum SyncError {
    /// Cycle or dangling reference in a dependency graph.
    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Dependency graph error in subtasks of task {parent}: {source}")]
    SubtaskGraph {
        parent: u32,
        #[source]
        source: GraphError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    /// A stage needed a mapping that an earlier stage should have produced.
    #[error("Missing mapping: {0}")]
    MissingMapping(String),

    #[error("Mapping conflict: {0}")]
    MappingConflict(String),

    #[error("{operation} failed for {entity}: {source}")]
    External {
        operation: TrackerOp,
        entity: String,
        #[source]
        source: TrackerError,
    },

    #[error("Issue tracker is not initialized in the target workspace (run `bd init` there first)")]
    TrackerNotInitialized,

    #[error("Mapping file {0:?} already exists; pass --force to start over or --resume to continue")]
    MappingExists(PathBuf),

    #[error("Failed to load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Missing top-level mapping for a parent task.
    pub fn missing_parent(parent: u32) -> Self {
        SyncError::MissingMapping(format!("no top-level mapping for parent task {parent}"))
    }

    /// Short machine-friendly name of the error kind, used in user-facing output.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Graph(_) | SyncError::SubtaskGraph { .. } => "graph",
            SyncError::Validation(_) => "validation",
            SyncError::MissingMapping(_) | SyncError::MappingConflict(_) => "missing-mapping",
            SyncError::External { .. } | SyncError::TrackerNotInitialized => "external-call",
            SyncError::MappingExists(_) | SyncError::Load { .. } => "load",
            SyncError::IoError(_)
            | SyncError::JsonError(_)
            | SyncError::TomlError(_)
            | SyncError::Other(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
