// tests/mapping_store.rs

use std::fs;

use tempfile::tempdir;
use tm2bd::errors::SyncError;
use tm2bd::mapping::{MappingStore, MappingSummary};

fn populated() -> MappingStore {
    let mut store = MappingStore::new();
    store.register_top_level(1, "bd-1").unwrap();
    store.register_top_level(5, "bd-5").unwrap();
    store.register_child(5, 50, "bd-50").unwrap();
    store.register_child(5, 51, "bd-51").unwrap();
    store.register_child(1, 1, "bd-1.1").unwrap();
    store.register_verification(5, "bd-v5").unwrap();
    store.record_edge("bd-5", "bd-1");
    store
}

#[test]
fn top_level_lookup_hits_and_misses() {
    let mut store = MappingStore::new();
    store.register_top_level(5, "X").unwrap();

    assert_eq!(store.top_level(5), Some("X"));
    assert_eq!(store.top_level(6), None);
}

#[test]
fn child_lookup_is_scoped_to_parent() {
    let mut store = MappingStore::new();
    store.register_top_level(5, "X").unwrap();
    store.register_top_level(6, "W").unwrap();
    store.register_child(5, 50, "Y").unwrap();

    assert_eq!(store.child(5, 50), Some("Y"));
    assert_eq!(store.child(6, 50), None);
    assert_eq!(store.child(5, 51), None);
    assert_eq!(store.child(99, 50), None);
}

#[test]
fn child_without_parent_fails_naming_parent() {
    let mut store = MappingStore::new();
    let err = store.register_child(999, 1, "Z").unwrap_err();

    assert!(matches!(err, SyncError::MissingMapping(_)));
    assert!(err.to_string().contains("999"), "{err}");
}

#[test]
fn verification_without_parent_fails_naming_parent() {
    let mut store = MappingStore::new();
    let err = store.register_verification(42, "V").unwrap_err();

    assert!(matches!(err, SyncError::MissingMapping(_)));
    assert!(err.to_string().contains("42"), "{err}");
    assert_eq!(store.verification(42), None);
}

#[test]
fn registered_entries_are_never_replaced() {
    let mut store = populated();

    assert!(matches!(
        store.register_top_level(5, "other"),
        Err(SyncError::MappingConflict(_))
    ));
    assert!(matches!(
        store.register_child(5, 50, "other"),
        Err(SyncError::MappingConflict(_))
    ));
    assert!(matches!(
        store.register_verification(5, "other"),
        Err(SyncError::MappingConflict(_))
    ));

    assert_eq!(store.top_level(5), Some("bd-5"));
    assert_eq!(store.child(5, 50), Some("bd-50"));
    assert_eq!(store.verification(5), Some("bd-v5"));
}

#[test]
fn summary_counts_all_levels() {
    assert_eq!(
        populated().summary(),
        MappingSummary {
            top_level: 2,
            children: 3,
            verification: 1,
            edges: 1,
        }
    );
}

#[test]
fn children_of_lists_children_by_subtask_id() {
    let store = populated();
    let children: Vec<(u32, &str)> = store.children_of(5).collect();
    assert_eq!(children, vec![(50, "bd-50"), (51, "bd-51")]);
    assert_eq!(store.children_of(77).count(), 0);
}

#[test]
fn save_and_load_reproduce_every_lookup() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");

    let mut store = populated();
    store.set_source_digest("abc123");
    store.save(&path).unwrap();

    let loaded = MappingStore::load(&path).unwrap();
    assert_eq!(loaded.summary(), store.summary());
    assert_eq!(loaded.entries(), store.entries());
    for (id, entry) in store.entries() {
        assert_eq!(loaded.top_level(*id), Some(entry.target_id.as_str()));
        assert_eq!(loaded.verification(*id), entry.verification_id.as_deref());
        for (child, target) in &entry.children {
            assert_eq!(loaded.child(*id, *child), Some(target.as_str()));
        }
    }
    assert!(loaded.has_edge("bd-5", "bd-1"));
    assert_eq!(loaded.source_digest(), Some("abc123"));
}

#[test]
fn saved_document_carries_version_timestamp_and_kinds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");
    populated().save(&path).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["version"], "1.0");
    assert!(doc["generatedAt"].is_string());
    let entry = &doc["entries"][1];
    assert_eq!(entry["sourceId"], 5);
    assert_eq!(entry["kind"], "epic");
    assert_eq!(entry["children"][0]["kind"], "task");
    assert_eq!(entry["verificationId"], "bd-v5");
}

#[test]
fn load_tolerates_unknown_fields_and_missing_optional_ones() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(
        &path,
        r#"{
            "version": "1.3",
            "generatedAt": "2026-01-01T00:00:00Z",
            "someFutureField": {"nested": true},
            "entries": [
                {"sourceId": 3, "targetId": "bd-3", "kind": "epic", "labels": ["x"]},
                {"sourceId": 4, "targetId": "bd-4", "kind": "epic",
                 "children": [{"sourceId": 1, "targetId": "bd-4.1", "kind": "task"}]}
            ]
        }"#,
    )
    .unwrap();

    let store = MappingStore::load(&path).unwrap();
    assert_eq!(store.top_level(3), Some("bd-3"));
    assert_eq!(store.child(4, 1), Some("bd-4.1"));
    assert_eq!(store.verification(3), None);
    assert_eq!(store.summary().edges, 0);
}

#[test]
fn load_missing_file_is_a_load_error() {
    let dir = tempdir().unwrap();
    let err = MappingStore::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SyncError::Load { .. }), "{err:?}");
}

#[test]
fn load_corrupt_file_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(&path, "{ not json").unwrap();

    let err = MappingStore::load(&path).unwrap_err();
    assert!(matches!(err, SyncError::Load { .. }), "{err:?}");
}

#[test]
fn load_rejects_wrong_discriminator_and_foreign_major_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");

    fs::write(
        &path,
        r#"{"version":"1.0","generatedAt":"2026-01-01T00:00:00Z",
            "entries":[{"sourceId":1,"targetId":"bd-1","kind":"task"}]}"#,
    )
    .unwrap();
    assert!(matches!(MappingStore::load(&path), Err(SyncError::Load { .. })));

    fs::write(
        &path,
        r#"{"version":"2.0","generatedAt":"2026-01-01T00:00:00Z","entries":[]}"#,
    )
    .unwrap();
    assert!(matches!(MappingStore::load(&path), Err(SyncError::Load { .. })));
}

#[test]
fn exists_check_has_no_side_effects() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");

    assert!(!MappingStore::exists(&path));
    assert!(!path.exists());

    MappingStore::new().save(&path).unwrap();
    assert!(MappingStore::exists(&path));
    assert!(!MappingStore::exists(dir.path()));
}

#[test]
fn checkpoint_writes_only_when_autosave_is_enabled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("mapping.json");

    let mut store = populated();
    store.checkpoint().unwrap();
    assert!(!path.exists());

    store.enable_autosave(&path);
    store.checkpoint().unwrap();
    assert_eq!(MappingStore::load(&path).unwrap().summary(), store.summary());
}
