// SPDX-License-Identifier: MIT

//! Top-level orchestrator error, aggregating every lower-layer error enum.

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Adapter(#[from] conductor_adapters::AdapterError),
    #[error(transparent)]
    Registry(#[from] conductor_registry::RegistryError),
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
}

#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    #[error("{path} is not a git repository")]
    NotAGitRepository { path: String },
    #[error("base branch {base_branch} does not resolve in {path}")]
    BaseBranchUnresolved { path: String, base_branch: String },
    #[error("repository {repository_id} already has the maximum of {max} worktrees")]
    RepositoryAtCapacity { repository_id: String, max: u32 },
    #[error("no worktree record for task {0}")]
    NotFound(String),
    #[error("git command failed: {0}")]
    GitCommand(String),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] conductor_storage::StorageError),
}
