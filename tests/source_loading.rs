// tests/source_loading.rs

use std::fs;

use tempfile::tempdir;
use tm2bd::errors::SyncError;
use tm2bd::source::{
    Priority, TaskStatus, load_task_list, load_task_source, parse_task_list, source_digest,
};

const LEGACY: &str = r#"{
  "tasks": [
    {
      "id": 1,
      "title": "Set up repository",
      "description": "Initialise the project",
      "status": "done",
      "priority": "high",
      "dependencies": [],
      "complexity": 3,
      "details": "Use cargo new",
      "testStrategy": "   "
    },
    {
      "id": "2",
      "title": "Add parser",
      "description": "Parse input files",
      "status": "in-progress",
      "dependencies": ["1"],
      "testStrategy": "Feed it fixtures",
      "subtasks": [
        {"id": 1, "title": "Tokenizer", "description": "Split input", "status": "done"},
        {"id": 2, "title": "Grammar", "description": "Build tree", "dependencies": ["2.1"]},
        {"id": 3, "title": "Errors", "description": "Report spans", "dependencies": [1, "2"]}
      ]
    }
  ]
}"#;

#[test]
fn legacy_layout_loads_and_coerces_ids() {
    let list = parse_task_list(LEGACY, "master").unwrap();

    assert_eq!(list.len(), 2);
    let first = list.get(1).unwrap();
    assert_eq!(first.status, TaskStatus::Done);
    assert_eq!(first.priority, Priority::High);
    assert_eq!(first.complexity, Some(3));
    assert_eq!(first.details.as_deref(), Some("Use cargo new"));
    // Blank test strategies count as absent.
    assert_eq!(first.test_strategy, None);

    let second = list.get(2).unwrap();
    assert_eq!(second.dependencies, vec![1]);
    assert_eq!(second.status, TaskStatus::InProgress);
    assert_eq!(second.priority, Priority::Medium);
    assert_eq!(second.subtasks.len(), 3);
    assert_eq!(second.subtasks[1].dependencies, vec![1]);
    assert_eq!(second.subtasks[2].dependencies, vec![1, 2]);

    assert_eq!(list.subtask_count(), 3);
    assert_eq!(list.test_strategy_count(), 1);
}

#[test]
fn tagged_layout_selects_requested_tag() {
    let json = r#"{
        "master": {"tasks": [{"id": 1, "title": "Main line"}]},
        "feature-x": {"tasks": [{"id": 7, "title": "Branch work"}, {"id": 8, "title": "More"}]}
    }"#;

    let master = parse_task_list(json, "master").unwrap();
    assert_eq!(master.len(), 1);
    assert_eq!(master.get(1).unwrap().title, "Main line");

    let feature = parse_task_list(json, "feature-x").unwrap();
    assert_eq!(feature.len(), 2);
    assert!(feature.get(7).is_some());
}

#[test]
fn missing_tag_lists_available_tags() {
    let json = r#"{"master": {"tasks": []}, "release": {"tasks": []}}"#;
    let err = parse_task_list(json, "nope").unwrap_err();

    assert!(matches!(err, SyncError::Validation(_)));
    let msg = err.to_string();
    assert!(msg.contains("nope"), "{msg}");
    assert!(msg.contains("master") && msg.contains("release"), "{msg}");
}

#[test]
fn empty_task_list_is_valid() {
    let list = parse_task_list(r#"{"tasks": []}"#, "master").unwrap();
    assert!(list.is_empty());
}

#[test]
fn unknown_status_is_preserved() {
    let json = r#"{"tasks": [{"id": 1, "title": "A", "status": "blocked"}]}"#;
    let list = parse_task_list(json, "master").unwrap();
    assert_eq!(
        list.get(1).unwrap().status,
        TaskStatus::Unknown("blocked".to_string())
    );
}

#[test]
fn validation_rejects_malformed_entries() {
    let cases = [
        (r#"{"tasks": [{"id": 1, "title": "A"}, {"id": 1, "title": "B"}]}"#, "duplicate task id 1"),
        (r#"{"tasks": [{"id": 0, "title": "A"}]}"#, "positive"),
        (r#"{"tasks": [{"id": -4, "title": "A"}]}"#, "not a positive integer"),
        (r#"{"tasks": [{"id": "abc", "title": "A"}]}"#, "not a positive integer"),
        (r#"{"tasks": [{"id": 1, "title": "  "}]}"#, "empty title"),
        (r#"{"tasks": [{"id": 1, "title": "A", "complexity": 11}]}"#, "complexity 11"),
        (r#"{"tasks": [{"id": 1, "title": "A", "dependencies": [2, 2]}, {"id": 2, "title": "B"}]}"#, "more than once"),
        (r#"{"tasks": [{"id": 1, "title": "A", "dependencies": ["x"]}]}"#, "invalid dependency"),
        (
            r#"{"tasks": [{"id": 1, "title": "A", "subtasks": [{"id": 1, "title": "s"}, {"id": 1, "title": "t"}]}]}"#,
            "duplicate subtask id 1",
        ),
        (
            r#"{"tasks": [{"id": 3, "title": "A", "subtasks": [{"id": 1, "title": "s", "dependencies": ["4.1"]}]}]}"#,
            "invalid sibling dependency",
        ),
    ];

    for (json, needle) in cases {
        let err = parse_task_list(json, "master").unwrap_err();
        assert!(
            matches!(err, SyncError::Validation(_)),
            "expected validation error for {json}, got {err:?}"
        );
        assert!(err.to_string().contains(needle), "{err} should mention {needle:?}");
    }
}

#[test]
fn wrongly_typed_fields_are_validation_errors() {
    let cases = [
        r#"{"tasks": [{"id": 1, "title": "a", "priority": "critical"}]}"#,
        r#"{"tasks": [{"id": 1}]}"#,
        r#"{"tasks": [{"id": true, "title": "a"}]}"#,
        r#"{"master": {"tasks": "none"}}"#,
    ];

    for json in cases {
        let err = parse_task_list(json, "master").unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)), "{json}: {err:?}");
        assert_eq!(err.kind(), "validation");
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, cases[0]).unwrap();
    let err = load_task_list(&path, "master").unwrap_err();
    assert_eq!(err.kind(), "validation", "{err}");
    assert!(err.to_string().contains("critical"), "{err}");
}

#[test]
fn missing_references_are_left_to_the_resolver() {
    let json = r#"{"tasks": [{"id": 1, "title": "A", "dependencies": [42]}]}"#;
    let list = parse_task_list(json, "master").unwrap();
    assert_eq!(list.get(1).unwrap().dependencies, vec![42]);
}

#[test]
fn load_reports_unreadable_and_malformed_files() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("tasks.json");
    let err = load_task_list(&missing, "master").unwrap_err();
    assert!(matches!(err, SyncError::Load { .. }), "{err:?}");

    fs::write(&missing, "{ this is not json").unwrap();
    let err = load_task_list(&missing, "master").unwrap_err();
    assert!(matches!(err, SyncError::Load { ref path, .. } if path == &missing), "{err:?}");
    assert_eq!(err.kind(), "load");
}

#[test]
fn load_reads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, LEGACY).unwrap();

    let list = load_task_list(&path, "master").unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn digest_describes_the_bytes_that_were_parsed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    fs::write(&path, LEGACY).unwrap();
    let first = load_task_source(&path, "master").unwrap();
    assert_eq!(first.tasks.len(), 2);
    assert_eq!(first.digest, source_digest(LEGACY.as_bytes()));
    assert_eq!(first.digest.len(), 64);

    let emptied = r#"{"tasks": []}"#;
    fs::write(&path, emptied).unwrap();
    let second = load_task_source(&path, "master").unwrap();
    assert!(second.tasks.is_empty());
    assert_eq!(second.digest, source_digest(emptied.as_bytes()));
    assert_ne!(first.digest, second.digest);
}
