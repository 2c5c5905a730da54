// SPDX-License-Identifier: MIT

use super::*;
use crate::log::LogLevel;
use conductor_core::{RepositoryId, TaskId, WorktreeId};

fn worktree(task_id: TaskId, repository_id: RepositoryId, created_at_ms: u64) -> Worktree {
    Worktree {
        id: WorktreeId::new(),
        task_id,
        repository_id,
        repository_path: "/repos/demo".to_string(),
        path: "/repos/demo-worktrees/task".to_string(),
        branch: "conductor/task".to_string(),
        base_branch: "main".to_string(),
        status: WorktreeStatus::Active,
        created_at_ms,
        updated_at_ms: created_at_ms,
        merged_at_ms: None,
        deleted_at_ms: None,
    }
}

#[test]
fn upsert_then_get_round_trips() {
    let store = InMemorySessionStore::new();
    let task_id = TaskId::new();
    let wt = worktree(task_id, RepositoryId::new(), 100);
    let id = wt.id;
    store.upsert_worktree(wt).unwrap();

    let fetched = store.get_worktree(&id).unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.task_id, task_id);
}

#[test]
fn get_worktree_by_task_finds_the_right_record() {
    let store = InMemorySessionStore::new();
    let repository_id = RepositoryId::new();
    let task_a = TaskId::new();
    let task_b = TaskId::new();
    store.upsert_worktree(worktree(task_a, repository_id, 1)).unwrap();
    store.upsert_worktree(worktree(task_b, repository_id, 2)).unwrap();

    let found = store.get_worktree_by_task(&task_b).unwrap();
    assert_eq!(found.task_id, task_b);
}

#[test]
fn list_worktrees_for_repository_is_sorted_by_creation_time() {
    let store = InMemorySessionStore::new();
    let repository_id = RepositoryId::new();
    let other_repository = RepositoryId::new();
    store.upsert_worktree(worktree(TaskId::new(), repository_id, 300)).unwrap();
    store.upsert_worktree(worktree(TaskId::new(), repository_id, 100)).unwrap();
    store.upsert_worktree(worktree(TaskId::new(), other_repository, 50)).unwrap();

    let listed = store.list_worktrees_for_repository(&repository_id);
    assert_eq!(listed.len(), 2);
    assert!(listed[0].created_at_ms < listed[1].created_at_ms);
}

#[test]
fn mark_worktree_status_merged_stamps_merged_at() {
    let store = InMemorySessionStore::new();
    let wt = worktree(TaskId::new(), RepositoryId::new(), 10);
    let id = wt.id;
    store.upsert_worktree(wt).unwrap();

    store.mark_worktree_status(&id, WorktreeStatus::Merged, 500).unwrap();

    let fetched = store.get_worktree(&id).unwrap();
    assert_eq!(fetched.status, WorktreeStatus::Merged);
    assert_eq!(fetched.merged_at_ms, Some(500));
    assert_eq!(fetched.updated_at_ms, 500);
}

#[yare::parameterized(
    active = { WorktreeStatus::Active },
    merged = { WorktreeStatus::Merged },
    deleted = { WorktreeStatus::Deleted },
)]
fn mark_worktree_status_updates_status_and_touches_updated_at(status: WorktreeStatus) {
    let store = InMemorySessionStore::new();
    let wt = worktree(TaskId::new(), RepositoryId::new(), 10);
    let id = wt.id;
    store.upsert_worktree(wt).unwrap();

    store.mark_worktree_status(&id, status, 42).unwrap();

    let fetched = store.get_worktree(&id).unwrap();
    assert_eq!(fetched.status, status);
    assert_eq!(fetched.updated_at_ms, 42);
}

#[test]
fn mark_worktree_status_missing_id_errors() {
    let store = InMemorySessionStore::new();
    let err = store.mark_worktree_status(&WorktreeId::new(), WorktreeStatus::Active, 1).unwrap_err();
    assert!(matches!(err, StorageError::WorktreeNotFound(_)));
}

#[test]
fn delete_worktree_soft_deletes() {
    let store = InMemorySessionStore::new();
    let wt = worktree(TaskId::new(), RepositoryId::new(), 10);
    let id = wt.id;
    store.upsert_worktree(wt).unwrap();

    store.delete_worktree(&id, 999).unwrap();

    let fetched = store.get_worktree(&id).unwrap();
    assert_eq!(fetched.status, WorktreeStatus::Deleted);
    assert_eq!(fetched.deleted_at_ms, Some(999));
}

#[test]
fn logs_for_task_are_ordered_by_timestamp_even_when_appended_out_of_order() {
    let store = InMemorySessionStore::new();
    let task_id = TaskId::new();
    let other_task = TaskId::new();
    let entry = |task_id: TaskId, timestamp_ms: u64, message: &str| ExecutionLogEntry {
        id: 0,
        task_id,
        agent_instance_id: "agent-1".to_string(),
        log_level: LogLevel::Info,
        message_type: "message_chunk".to_string(),
        message: message.to_string(),
        metadata: serde_json::Value::Null,
        timestamp_ms,
    };

    store.append_log(entry(task_id, 300, "third"));
    store.append_log(entry(other_task, 50, "unrelated"));
    store.append_log(entry(task_id, 100, "first"));
    store.append_log(entry(task_id, 200, "second"));

    let logs = store.logs_for_task(&task_id);
    let messages: Vec<&str> = logs.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[test]
fn append_log_assigns_monotonic_ids() {
    let store = InMemorySessionStore::new();
    let task_id = TaskId::new();
    let entry = |timestamp_ms: u64| ExecutionLogEntry {
        id: 0,
        task_id,
        agent_instance_id: "agent-1".to_string(),
        log_level: LogLevel::Debug,
        message_type: "tool_call".to_string(),
        message: "ran".to_string(),
        metadata: serde_json::Value::Null,
        timestamp_ms,
    };
    store.append_log(entry(1));
    store.append_log(entry(2));

    let logs = store.logs_for_task(&task_id);
    assert!(logs[0].id < logs[1].id);
}
