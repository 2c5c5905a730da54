// SPDX-License-Identifier: MIT

//! Worktree record data model and branch-name sanitization.
//!
//! Lifecycle operations (create/remove/recreate/reconcile) live in
//! `conductor-engine`; this module only holds the record shape and the
//! pure sanitization helpers shared by the manager and its tests.

use crate::ids::{RepositoryId, TaskId, WorktreeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorktreeStatus {
    Active,
    Merged,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    pub id: WorktreeId,
    pub task_id: TaskId,
    pub repository_id: RepositoryId,
    pub repository_path: String,
    pub path: String,
    pub branch: String,
    pub base_branch: String,
    pub status: WorktreeStatus,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at_ms: Option<u64>,
}

/// Lowercase, collapse non-alphanumerics to single `-`, strip leading and
/// trailing `-`, truncate to `max_len`, then strip any hyphen left dangling
/// at the truncated tail.
pub fn sanitize_for_branch(title: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_was_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    let truncated: String = trimmed.chars().take(max_len).collect();
    truncated.trim_end_matches('-').to_string()
}

/// `{sanitized(title)}_{suffix}`, or just `suffix` if the title sanitizes to
/// nothing (e.g. punctuation-only titles).
pub fn semantic_worktree_name(title: &str, suffix: &str) -> String {
    let sanitized = sanitize_for_branch(title, usize::MAX);
    if sanitized.is_empty() {
        suffix.to_string()
    } else {
        format!("{}_{}", sanitized, suffix)
    }
}

/// A worktree is only valid when its directory exists and contains a `.git`
/// **file** (not directory) whose content begins with `gitdir:`. Worktrees
/// always use the file form; a `.git` directory means this path is a
/// standalone clone, not a worktree.
pub fn is_valid_worktree_dir(path: &std::path::Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let git_path = path.join(".git");
    let Ok(metadata) = std::fs::symlink_metadata(&git_path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    match std::fs::read(&git_path) {
        Ok(bytes) => bytes.starts_with(b"gitdir:"),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
