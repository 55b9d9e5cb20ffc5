// tests/status_reconciler.rs

use std::sync::{Arc, Mutex};

use tm2bd::errors::SyncError;
use tm2bd::mapping::MappingStore;
use tm2bd::source::{Task, TaskStatus};
use tm2bd::sync::{
    StatusAction, StatusCount, StatusNames, TargetStatus, reconcile_statuses, status_action,
};
use tm2bd_test_utils::builders::{SubtaskBuilder, TaskBuilder};
use tm2bd_test_utils::fake_tracker::{FakeTracker, TrackerCall};
use tm2bd_test_utils::init_tracing;

#[test]
fn fixed_status_mapping() {
    assert_eq!(status_action(&TaskStatus::Pending), StatusAction::None);
    assert_eq!(
        status_action(&TaskStatus::InProgress),
        StatusAction::Update(TargetStatus::InProgress)
    );
    assert_eq!(status_action(&TaskStatus::Done), StatusAction::Close);
    assert_eq!(
        status_action(&TaskStatus::Deferred),
        StatusAction::Update(TargetStatus::Deferred)
    );
    assert_eq!(
        status_action(&TaskStatus::Unknown("review".into())),
        StatusAction::None
    );
}

#[test]
fn status_strings_are_parsed_leniently() {
    assert_eq!(TaskStatus::from("in_progress"), TaskStatus::InProgress);
    assert_eq!(TaskStatus::from("In-Progress"), TaskStatus::InProgress);
    assert_eq!(TaskStatus::from(" DONE "), TaskStatus::Done);
    assert_eq!(TaskStatus::from("cancelled").to_string(), "cancelled");
}

fn tasks() -> Vec<Task> {
    vec![
        TaskBuilder::new(1, "pending").build(),
        TaskBuilder::new(2, "active")
            .status(TaskStatus::InProgress)
            .subtask(SubtaskBuilder::new(2, "finished").status(TaskStatus::Done).build())
            .subtask(SubtaskBuilder::new(1, "parked").status(TaskStatus::Deferred).build())
            .subtask(SubtaskBuilder::new(3, "unmapped").status(TaskStatus::Done).build())
            .build(),
        TaskBuilder::new(3, "shipped").status(TaskStatus::Done).build(),
        TaskBuilder::new(4, "odd")
            .status(TaskStatus::Unknown("blocked".into()))
            .build(),
    ]
}

fn mapped_store() -> MappingStore {
    let mut store = MappingStore::new();
    for id in 1..=4 {
        store.register_top_level(id, format!("bd-{id}")).unwrap();
    }
    store.register_child(2, 1, "bd-2.1").unwrap();
    store.register_child(2, 2, "bd-2.2").unwrap();
    store
}

#[tokio::test]
async fn tasks_first_then_subtasks_by_id() {
    init_tracing();

    let tasks = tasks();
    let ordered: Vec<&Task> = tasks.iter().collect();
    let store = mapped_store();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut tracker = FakeTracker::new(calls.clone());

    let count = reconcile_statuses(&mut tracker, &store, &ordered, &StatusNames::default())
        .await
        .unwrap();

    assert_eq!(count, StatusCount { updated: 2, closed: 2 });
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            TrackerCall::UpdateStatus {
                id: "bd-2".into(),
                status: "in_progress".into()
            },
            TrackerCall::Close { id: "bd-3".into() },
            TrackerCall::UpdateStatus {
                id: "bd-2.1".into(),
                status: "deferred".into()
            },
            TrackerCall::Close { id: "bd-2.2".into() },
        ]
    );
}

#[tokio::test]
async fn configured_status_names_are_used() {
    init_tracing();

    let tasks = vec![
        TaskBuilder::new(1, "a").status(TaskStatus::InProgress).build(),
        TaskBuilder::new(2, "b").status(TaskStatus::Deferred).build(),
    ];
    let ordered: Vec<&Task> = tasks.iter().collect();
    let mut store = MappingStore::new();
    store.register_top_level(1, "bd-1").unwrap();
    store.register_top_level(2, "bd-2").unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut tracker = FakeTracker::new(calls.clone());
    let names = StatusNames {
        in_progress: "doing".into(),
        deferred: "backlog".into(),
    };

    reconcile_statuses(&mut tracker, &store, &ordered, &names)
        .await
        .unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            TrackerCall::UpdateStatus {
                id: "bd-1".into(),
                status: "doing".into()
            },
            TrackerCall::UpdateStatus {
                id: "bd-2".into(),
                status: "backlog".into()
            },
        ]
    );
}

#[tokio::test]
async fn unmapped_task_is_an_error() {
    init_tracing();

    let tasks = vec![TaskBuilder::new(9, "ghost").status(TaskStatus::Done).build()];
    let ordered: Vec<&Task> = tasks.iter().collect();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut tracker = FakeTracker::new(calls.clone());

    let err = reconcile_statuses(&mut tracker, &MappingStore::new(), &ordered, &StatusNames::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::MissingMapping(_)), "{err:?}");
    assert!(calls.lock().unwrap().is_empty());
}
