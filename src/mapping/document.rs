// src/mapping/document.rs

//! On-disk format of the mapping file.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "generatedAt": "2026-01-01T00:00:00Z",
//!   "sourceDigest": "…",
//!   "entries": [
//!     {
//!       "sourceId": 1,
//!       "targetId": "bd-a1",
//!       "kind": "epic",
//!       "children": [{ "sourceId": 1, "targetId": "bd-a2", "kind": "task" }],
//!       "verificationId": "bd-a3"
//!     }
//!   ],
//!   "edges": [{ "blocked": "bd-a2", "blocking": "bd-a1" }]
//! }
//! ```
//!
//! Readers ignore unknown fields, and every field added after `1.0`
//! (`sourceDigest`, `edges`) has a default, so documents stay readable in
//! both directions within the same major version.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapping::store::{MappingEntry, MappingStore};
use crate::tracker::IssueKind;

pub const MAPPING_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
    pub entries: Vec<EntryRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub source_id: u32,
    pub target_id: String,
    pub kind: IssueKind,
    #[serde(default)]
    pub children: Vec<ChildRecord>,
    #[serde(default)]
    pub verification_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub source_id: u32,
    pub target_id: String,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub blocked: String,
    pub blocking: String,
}

impl MappingDocument {
    pub fn from_store(store: &MappingStore) -> Self {
        let entries = store
            .entries()
            .iter()
            .map(|(source_id, entry)| EntryRecord {
                source_id: *source_id,
                target_id: entry.target_id.clone(),
                kind: IssueKind::Epic,
                children: entry
                    .children
                    .iter()
                    .map(|(id, target)| ChildRecord {
                        source_id: *id,
                        target_id: target.clone(),
                        kind: IssueKind::Task,
                    })
                    .collect(),
                verification_id: entry.verification_id.clone(),
            })
            .collect();

        let edges = store
            .edges()
            .map(|(blocked, blocking)| EdgeRecord {
                blocked: blocked.to_string(),
                blocking: blocking.to_string(),
            })
            .collect();

        Self {
            version: MAPPING_VERSION.to_string(),
            generated_at: Utc::now(),
            source_digest: store.source_digest().map(str::to_string),
            entries,
            edges,
        }
    }

    /// Rebuild the store, rejecting documents from another major version,
    /// entries with the wrong kind, and duplicated ids.
    pub fn into_store(self) -> Result<MappingStore, String> {
        let major = |v: &str| v.split('.').next().map(str::to_string);
        if major(&self.version) != major(MAPPING_VERSION) {
            return Err(format!(
                "unsupported mapping version {} (expected {MAPPING_VERSION})",
                self.version
            ));
        }

        let mut entries = BTreeMap::new();
        for record in self.entries {
            if record.kind != IssueKind::Epic {
                return Err(format!(
                    "entry for task {} has kind {:?}, expected epic",
                    record.source_id, record.kind
                ));
            }
            let mut children = BTreeMap::new();
            for child in record.children {
                if child.kind != IssueKind::Task {
                    return Err(format!(
                        "child {}.{} has kind {:?}, expected task",
                        record.source_id, child.source_id, child.kind
                    ));
                }
                if children.insert(child.source_id, child.target_id).is_some() {
                    return Err(format!(
                        "duplicate child {}.{}",
                        record.source_id, child.source_id
                    ));
                }
            }
            let entry = MappingEntry {
                target_id: record.target_id,
                children,
                verification_id: record.verification_id,
            };
            if entries.insert(record.source_id, entry).is_some() {
                return Err(format!("duplicate entry for task {}", record.source_id));
            }
        }

        let edges: BTreeSet<(String, String)> = self
            .edges
            .into_iter()
            .map(|e| (e.blocked, e.blocking))
            .collect();

        Ok(MappingStore::from_parts(entries, edges, self.source_digest))
    }
}
