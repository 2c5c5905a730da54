// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("worktree not found: {0}")]
    WorktreeNotFound(String),
}
