// SPDX-License-Identifier: MIT

//! In-process reference implementation of `SessionStore`, backed by one
//! `parking_lot::RwLock`-guarded map per entity kind rather than a query
//! layer.

use crate::error::StorageError;
use crate::log::ExecutionLogEntry;
use crate::store::SessionStore;
use conductor_core::{RepositoryId, TaskId, Worktree, WorktreeId, WorktreeStatus};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct InMemorySessionStore {
    worktrees: RwLock<HashMap<WorktreeId, Worktree>>,
    logs: RwLock<Vec<ExecutionLogEntry>>,
    next_log_id: AtomicU64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_log_id(&self) -> u64 {
        self.next_log_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl SessionStore for InMemorySessionStore {
    fn upsert_worktree(&self, worktree: Worktree) -> Result<(), StorageError> {
        self.worktrees.write().insert(worktree.id, worktree);
        Ok(())
    }

    fn get_worktree(&self, id: &WorktreeId) -> Option<Worktree> {
        self.worktrees.read().get(id).cloned()
    }

    fn get_worktree_by_task(&self, task_id: &TaskId) -> Option<Worktree> {
        self.worktrees.read().values().find(|w| &w.task_id == task_id).cloned()
    }

    fn list_worktrees_for_repository(&self, repository_id: &RepositoryId) -> Vec<Worktree> {
        let mut matches: Vec<Worktree> = self.worktrees.read().values().filter(|w| &w.repository_id == repository_id).cloned().collect();
        matches.sort_by_key(|w| w.created_at_ms);
        matches
    }

    fn mark_worktree_status(&self, id: &WorktreeId, status: WorktreeStatus, now_ms: u64) -> Result<(), StorageError> {
        let mut guard = self.worktrees.write();
        let worktree = guard.get_mut(id).ok_or_else(|| StorageError::WorktreeNotFound(id.as_str().to_string()))?;
        worktree.status = status;
        worktree.updated_at_ms = now_ms;
        if status == WorktreeStatus::Merged {
            worktree.merged_at_ms = Some(now_ms);
        }
        Ok(())
    }

    fn delete_worktree(&self, id: &WorktreeId, now_ms: u64) -> Result<(), StorageError> {
        let mut guard = self.worktrees.write();
        let worktree = guard.get_mut(id).ok_or_else(|| StorageError::WorktreeNotFound(id.as_str().to_string()))?;
        worktree.status = WorktreeStatus::Deleted;
        worktree.updated_at_ms = now_ms;
        worktree.deleted_at_ms = Some(now_ms);
        Ok(())
    }

    fn append_log(&self, mut entry: ExecutionLogEntry) {
        entry.id = self.next_log_id();
        self.logs.write().push(entry);
    }

    fn logs_for_task(&self, task_id: &TaskId) -> Vec<ExecutionLogEntry> {
        let mut matches: Vec<ExecutionLogEntry> = self.logs.read().iter().filter(|l| &l.task_id == task_id).cloned().collect();
        matches.sort_by_key(|l| l.timestamp_ms);
        matches
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
