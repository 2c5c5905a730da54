// SPDX-License-Identifier: MIT

//! `SessionStore`: the persistence contract the orchestrator and worktree
//! manager depend on. A real deployment backs this with a relational store
//! (see the column shapes documented on `Worktree` and `ExecutionLogEntry`);
//! this crate ships only an in-process reference implementation.

use crate::error::StorageError;
use crate::log::ExecutionLogEntry;
use conductor_core::{RepositoryId, TaskId, Worktree, WorktreeId, WorktreeStatus};

pub trait SessionStore: Send + Sync {
    fn upsert_worktree(&self, worktree: Worktree) -> Result<(), StorageError>;

    fn get_worktree(&self, id: &WorktreeId) -> Option<Worktree>;

    fn get_worktree_by_task(&self, task_id: &TaskId) -> Option<Worktree>;

    fn list_worktrees_for_repository(&self, repository_id: &RepositoryId) -> Vec<Worktree>;

    fn mark_worktree_status(&self, id: &WorktreeId, status: WorktreeStatus, now_ms: u64) -> Result<(), StorageError>;

    fn delete_worktree(&self, id: &WorktreeId, now_ms: u64) -> Result<(), StorageError>;

    fn append_log(&self, entry: ExecutionLogEntry);

    /// Ordered by `timestamp_ms` ascending, per the column contract.
    fn logs_for_task(&self, task_id: &TaskId) -> Vec<ExecutionLogEntry>;
}
