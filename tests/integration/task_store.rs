//! Integration tests for the task store.
//!
//! Covers the create / assign / status / filter / overdue contract,
//! snapshot semantics, failure atomicity and concurrent access.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use taskboard::clock::ManualClock;
use taskboard::config::StoreConfig;
use taskboard::tasks::{TaskError, TaskStore, ValidationError, Workflow};
use taskboard_proto::codec;
use taskboard_proto::filter::TaskFilter;
use taskboard_proto::task::{NewTask, Priority, Task, TaskDetails, TaskId, TaskKind, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Creates a store whose clock starts at 2024-01-15.
fn make_store() -> (TaskStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(at(2024, 1, 15)));
    (TaskStore::new().with_clock(clock.clone()), clock)
}

fn development(priority: Priority, deadline: DateTime<Utc>) -> NewTask {
    NewTask::new(
        "Implement Authentication",
        priority,
        deadline,
        TaskDetails::Development {
            repo_link: "github.com/project/auth".to_string(),
            branch: None,
        },
    )
}

fn design(priority: Priority, deadline: DateTime<Utc>) -> NewTask {
    NewTask::new(
        "Create Login Page Mockup",
        priority,
        deadline,
        TaskDetails::Design {
            asset_url: "figma.com/file/login-design".to_string(),
            revision: 1,
        },
    )
}

fn documentation(priority: Priority, deadline: DateTime<Utc>) -> NewTask {
    NewTask::new(
        "Write onboarding guide",
        priority,
        deadline,
        TaskDetails::Documentation {
            document_ref: "docs/onboarding.md".to_string(),
            target_audience: vec!["new hires".to_string(), "contractors".to_string()],
        },
    )
    .with_description("Cover local setup and first deploy")
}

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

// ===========================================================================
// Overdue scenario
// ===========================================================================

#[test]
fn overdue_development_task_clears_when_done() {
    let (store, clock) = make_store();
    let task = store
        .create_task(development(Priority::High, at(2024, 1, 1)))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);

    clock.set(at(2024, 6, 1));
    assert_eq!(ids(&store.overdue_tasks()), vec![task.id.clone()]);

    store.update_status(&task.id, TaskStatus::Done).unwrap();
    assert!(store.overdue_tasks().is_empty());
}

#[test]
fn overdue_ignores_deadline_equal_to_now() {
    let (store, clock) = make_store();
    store
        .create_task(design(Priority::Low, at(2024, 3, 1)))
        .unwrap();
    clock.set(at(2024, 3, 1));
    assert!(store.overdue_tasks().is_empty());
    clock.advance(TimeDelta::seconds(1));
    assert_eq!(store.overdue_tasks().len(), 1);
}

#[test]
fn overdue_includes_every_open_status() {
    let (store, clock) = make_store();
    let todo = store
        .create_task(development(Priority::High, at(2024, 1, 1)))
        .unwrap();
    let in_progress = store
        .create_task(design(Priority::High, at(2024, 1, 2)))
        .unwrap();
    let review = store
        .create_task(documentation(Priority::High, at(2024, 1, 3)))
        .unwrap();
    store
        .update_status(&in_progress.id, TaskStatus::InProgress)
        .unwrap();
    store
        .update_status(&review.id, TaskStatus::UnderReview)
        .unwrap();
    clock.set(at(2024, 6, 1));

    assert_eq!(
        ids(&store.overdue_tasks()),
        vec![todo.id, in_progress.id, review.id]
    );
}

// ===========================================================================
// Filter exactness
// ===========================================================================

#[test]
fn filter_exactness_across_kinds() {
    let (store, _) = make_store();
    let dev = store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    store
        .create_task(design(Priority::Medium, at(2024, 1, 30)))
        .unwrap();

    let high = store.filter_tasks(&TaskFilter::new().with_priority(Priority::High));
    assert_eq!(high, vec![dev]);

    let design_high = store.filter_tasks(
        &TaskFilter::new()
            .with_kind(TaskKind::Design)
            .with_priority(Priority::High),
    );
    assert!(design_high.is_empty());
}

#[test]
fn filter_by_status_tracks_updates() {
    let (store, _) = make_store();
    let a = store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    let b = store
        .create_task(documentation(Priority::Low, at(2024, 2, 1)))
        .unwrap();
    store.update_status(&a.id, TaskStatus::InProgress).unwrap();

    let todo = store.filter_tasks(&TaskFilter::new().with_status(TaskStatus::Todo));
    assert_eq!(ids(&todo), vec![b.id]);
    let active = store.filter_tasks(&TaskFilter::new().with_status(TaskStatus::InProgress));
    assert_eq!(ids(&active), vec![a.id]);
}

#[test]
fn filter_decoded_from_json_criteria() {
    let (store, _) = make_store();
    let docs = store
        .create_task(documentation(Priority::Medium, at(2024, 2, 1)))
        .unwrap();
    store
        .create_task(development(Priority::Medium, at(2024, 2, 1)))
        .unwrap();

    let filter: TaskFilter =
        codec::decode(r#"{"type":"documentation","priority":"medium"}"#).unwrap();
    assert_eq!(store.filter_tasks(&filter), vec![docs]);
}

// ===========================================================================
// Not-found contract and atomicity
// ===========================================================================

#[test]
fn assign_unknown_id_leaves_store_unchanged() {
    let (store, _) = make_store();
    store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    store
        .create_task(design(Priority::Low, at(2024, 2, 1)))
        .unwrap();
    let before = store.tasks();

    let missing = TaskId::new();
    let err = store.assign_task(&missing, "x").unwrap_err();
    assert_eq!(err, TaskError::NotFound(missing.to_string()));
    assert_eq!(err.to_string(), format!("task not found: {missing}"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks(), before);
}

#[test]
fn rejected_create_does_not_insert() {
    let (store, _) = make_store();
    let mut input = design(Priority::Low, at(2024, 2, 1));
    input.details = TaskDetails::Design {
        asset_url: String::new(),
        revision: 0,
    };
    let err = store.create_task(input).unwrap_err();
    assert!(matches!(
        err,
        TaskError::Validation(ValidationError::MissingField {
            kind: TaskKind::Design,
            field: "assetUrl",
        })
    ));
    assert!(store.is_empty());
}

#[test]
fn rejected_transition_keeps_previous_snapshot() {
    let clock = Arc::new(ManualClock::new(at(2024, 1, 15)));
    let store = TaskStore::with_config(StoreConfig {
        workflow: Workflow::Sequential,
        ..StoreConfig::default()
    })
    .with_clock(clock.clone());
    let task = store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    clock.advance(TimeDelta::hours(1));

    assert!(store.update_status(&task.id, TaskStatus::Done).is_err());
    assert_eq!(store.get_task(&task.id).unwrap(), task);
}

// ===========================================================================
// Variant field isolation and timestamps
// ===========================================================================

#[test]
fn mutations_preserve_kind_specific_fields() {
    let (store, clock) = make_store();
    for input in [
        development(Priority::High, at(2024, 2, 1)),
        design(Priority::Medium, at(2024, 2, 1)),
        documentation(Priority::Low, at(2024, 2, 1)),
    ] {
        let created = store.create_task(input).unwrap();
        clock.advance(TimeDelta::seconds(1));
        store.assign_task(&created.id, "john.doe").unwrap();
        clock.advance(TimeDelta::seconds(1));
        let last = store
            .update_status(&created.id, TaskStatus::UnderReview)
            .unwrap();

        assert_eq!(last.kind(), created.kind());
        assert_eq!(last.details, created.details);
        assert_eq!(last.description, created.description);
        assert_eq!(last.created_at, created.created_at);
        assert!(last.updated_at > created.updated_at);
    }
}

#[test]
fn updated_at_strictly_advances_with_the_clock() {
    let (store, clock) = make_store();
    let task = store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    let mut previous = task.updated_at;
    for status in [
        TaskStatus::InProgress,
        TaskStatus::UnderReview,
        TaskStatus::Done,
    ] {
        clock.advance(TimeDelta::milliseconds(1));
        let updated = store.update_status(&task.id, status).unwrap();
        assert!(updated.updated_at > previous);
        previous = updated.updated_at;
    }
}

#[test]
fn updated_at_equal_when_clock_does_not_move() {
    let (store, _) = make_store();
    let task = store
        .create_task(development(Priority::High, at(2024, 2, 1)))
        .unwrap();
    let updated = store.assign_task(&task.id, "alice").unwrap();
    assert_eq!(updated.updated_at, task.updated_at);
}

// ===========================================================================
// Snapshots and round-trip
// ===========================================================================

#[test]
fn created_task_round_trips_through_lookup_and_filter() {
    let (store, _) = make_store();
    let created = store
        .create_task(documentation(Priority::Medium, at(2024, 2, 1)))
        .unwrap();
    assert_eq!(store.get_task(&created.id).unwrap(), created);
    let found: Vec<Task> = store
        .filter_tasks(&TaskFilter::default())
        .into_iter()
        .filter(|t| t.id == created.id)
        .collect();
    assert_eq!(found, vec![created]);
}

#[test]
fn snapshots_survive_json_encoding() {
    let (store, _) = make_store();
    let created = store
        .create_task(development(Priority::High, at(2024, 2, 1)).with_assignee("john.doe"))
        .unwrap();
    let text = codec::encode(&created).unwrap();
    assert!(text.contains(r#""type":"development""#));
    assert!(text.contains(r#""status":"todo""#));
    let decoded: Task = codec::decode(&text).unwrap();
    assert_eq!(decoded, created);
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[test]
fn concurrent_creates_and_updates_are_serialized() {
    let store = Arc::new(TaskStore::new());
    let seed = store
        .create_task(development(Priority::High, at(2030, 1, 1)))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let seed_id = seed.id.clone();
            thread::spawn(move || {
                let mut created = Vec::new();
                for _ in 0..25 {
                    created.push(
                        store
                            .create_task(design(Priority::Low, at(2030, 1, 1)))
                            .unwrap()
                            .id,
                    );
                    store.assign_task(&seed_id, format!("worker-{i}")).unwrap();
                    assert!(!store.filter_tasks(&TaskFilter::default()).is_empty());
                }
                created
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(all.insert(id));
        }
    }
    assert_eq!(all.len(), 200);
    assert_eq!(store.len(), 201);

    let seed_now = store.get_task(&seed.id).unwrap();
    assert!(
        seed_now
            .assignee
            .as_deref()
            .is_some_and(|a| a.starts_with("worker-"))
    );
    assert_eq!(seed_now.details, seed.details);
}
