// src/mapping/store.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{Result, SyncError};
use crate::mapping::document::MappingDocument;

/// Everything created in the tracker for one source task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingEntry {
    pub target_id: String,
    /// Subtask id -> tracker id.
    pub children: BTreeMap<u32, String>,
    pub verification_id: Option<String>,
}

/// Summary counts over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSummary {
    pub top_level: usize,
    pub children: usize,
    pub verification: usize,
    pub edges: usize,
}

/// Source id -> tracker id table at all three levels, plus the set of
/// blocked-by edges already added.
///
/// Entries are only ever added, never replaced: registering an id twice is a
/// [`SyncError::MappingConflict`]. Lookups never fail; unknown ids yield `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MappingStore {
    entries: BTreeMap<u32, MappingEntry>,
    edges: BTreeSet<(String, String)>,
    source_digest: Option<String>,
    autosave: Option<PathBuf>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_top_level(&mut self, source: u32, target: impl Into<String>) -> Result<()> {
        let target = target.into();
        if let Some(existing) = self.entries.get(&source) {
            return Err(SyncError::MappingConflict(format!(
                "task {source} is already mapped to {}",
                existing.target_id
            )));
        }
        debug!(task = source, target = %target, "registered top-level mapping");
        self.entries.insert(
            source,
            MappingEntry {
                target_id: target,
                ..MappingEntry::default()
            },
        );
        Ok(())
    }

    pub fn register_child(
        &mut self,
        parent: u32,
        child: u32,
        target: impl Into<String>,
    ) -> Result<()> {
        let target = target.into();
        let entry = self
            .entries
            .get_mut(&parent)
            .ok_or_else(|| SyncError::missing_parent(parent))?;
        if let Some(existing) = entry.children.get(&child) {
            return Err(SyncError::MappingConflict(format!(
                "subtask {parent}.{child} is already mapped to {existing}"
            )));
        }
        debug!(task = parent, subtask = child, target = %target, "registered child mapping");
        entry.children.insert(child, target);
        Ok(())
    }

    pub fn register_verification(&mut self, parent: u32, target: impl Into<String>) -> Result<()> {
        let target = target.into();
        let entry = self
            .entries
            .get_mut(&parent)
            .ok_or_else(|| SyncError::missing_parent(parent))?;
        if let Some(existing) = &entry.verification_id {
            return Err(SyncError::MappingConflict(format!(
                "task {parent} already has verification item {existing}"
            )));
        }
        debug!(task = parent, target = %target, "registered verification mapping");
        entry.verification_id = Some(target);
        Ok(())
    }

    pub fn top_level(&self, source: u32) -> Option<&str> {
        self.entries.get(&source).map(|e| e.target_id.as_str())
    }

    pub fn child(&self, parent: u32, child: u32) -> Option<&str> {
        self.entries
            .get(&parent)
            .and_then(|e| e.children.get(&child))
            .map(String::as_str)
    }

    pub fn verification(&self, parent: u32) -> Option<&str> {
        self.entries
            .get(&parent)
            .and_then(|e| e.verification_id.as_deref())
    }

    /// Tracker ids of all children registered under `parent`, by subtask id.
    pub fn children_of(&self, parent: u32) -> impl Iterator<Item = (u32, &str)> {
        self.entries
            .get(&parent)
            .into_iter()
            .flat_map(|e| e.children.iter().map(|(id, t)| (*id, t.as_str())))
    }

    pub fn entries(&self) -> &BTreeMap<u32, MappingEntry> {
        &self.entries
    }

    pub fn summary(&self) -> MappingSummary {
        MappingSummary {
            top_level: self.entries.len(),
            children: self.entries.values().map(|e| e.children.len()).sum(),
            verification: self
                .entries
                .values()
                .filter(|e| e.verification_id.is_some())
                .count(),
            edges: self.edges.len(),
        }
    }

    pub fn has_edge(&self, blocked: &str, blocking: &str) -> bool {
        self.edges
            .contains(&(blocked.to_string(), blocking.to_string()))
    }

    pub fn record_edge(&mut self, blocked: &str, blocking: &str) {
        self.edges.insert((blocked.to_string(), blocking.to_string()));
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn source_digest(&self) -> Option<&str> {
        self.source_digest.as_deref()
    }

    pub fn set_source_digest(&mut self, digest: impl Into<String>) {
        self.source_digest = Some(digest.into());
    }

    /// Write the store to `path` after every [`checkpoint`](Self::checkpoint).
    pub fn enable_autosave(&mut self, path: impl Into<PathBuf>) {
        self.autosave = Some(path.into());
    }

    /// Persist to the autosave path, if one is configured.
    pub fn checkpoint(&self) -> Result<()> {
        match &self.autosave {
            Some(path) => self.save(path),
            None => Ok(()),
        }
    }

    /// Whether `path` already holds a mapping file. Never touches the file.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Serialize to `path`, replacing any previous file.
    ///
    /// The document is written to a sibling temp file first and then renamed,
    /// so an interrupted write leaves the previous checkpoint intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&MappingDocument::from_store(self))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = ?path, "mapping saved");
        Ok(())
    }

    /// Load a store previously written by [`save`](Self::save).
    ///
    /// A missing, unreadable or malformed file is a [`SyncError::Load`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |reason: String| SyncError::Load {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let doc: MappingDocument =
            serde_json::from_str(&contents).map_err(|e| load_err(e.to_string()))?;
        let store = doc.into_store().map_err(load_err)?;

        let summary = store.summary();
        info!(
            path = ?path,
            top_level = summary.top_level,
            children = summary.children,
            verification = summary.verification,
            "mapping loaded"
        );
        Ok(store)
    }

    pub(crate) fn from_parts(
        entries: BTreeMap<u32, MappingEntry>,
        edges: BTreeSet<(String, String)>,
        source_digest: Option<String>,
    ) -> Self {
        Self {
            entries,
            edges,
            source_digest,
            autosave: None,
        }
    }
}
