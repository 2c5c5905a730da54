// SPDX-License-Identifier: MIT

//! Git worktree lifecycle, keyed by `(repository_path, task_id)` with
//! per-repository mutexes serializing `git worktree` invocations against a
//! single repo.

use crate::config::DaemonConfig;
use crate::error::WorktreeError;
use conductor_core::worktree::is_valid_worktree_dir;
use conductor_core::{RepositoryId, TaskId, Worktree, WorktreeId, WorktreeStatus};
use conductor_storage::SessionStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BRANCH_PREFIX: &str = "kandev/";
const DEFAULT_MAX_PER_REPO: u32 = 8;

#[derive(Debug, Clone)]
pub struct CreateWorktreeRequest {
    pub task_id: TaskId,
    pub repository_id: RepositoryId,
    pub repository_path: PathBuf,
    pub base_branch: String,
    pub branch_name: Option<String>,
}

/// Owns the persisted worktree records (via `SessionStore`) and one mutex
/// per repository path, serializing `git worktree` invocations against a
/// single repository.
pub struct WorktreeManager {
    base_dir: PathBuf,
    branch_prefix: String,
    max_per_repo: u32,
    store: Arc<dyn SessionStore>,
    repo_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl WorktreeManager {
    pub fn new(base_dir: impl Into<PathBuf>, store: Arc<dyn SessionStore>) -> Self {
        Self { base_dir: base_dir.into(), branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(), max_per_repo: DEFAULT_MAX_PER_REPO, store, repo_locks: Mutex::new(HashMap::new()) }
    }

    pub fn from_config(config: &DaemonConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            base_dir: config.worktree_base_path.clone(),
            branch_prefix: config.branch_prefix.clone(),
            max_per_repo: config.max_worktrees_per_repo,
            store,
            repo_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_per_repo(mut self, max: u32) -> Self {
        self.max_per_repo = max;
        self
    }

    fn repo_lock(&self, repo_path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        self.repo_locks.lock().entry(repo_path.to_path_buf()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))).clone()
    }

    pub async fn create(&self, req: CreateWorktreeRequest, now_ms: u64) -> Result<Worktree, WorktreeError> {
        if !req.repository_path.join(".git").exists() {
            return Err(WorktreeError::NotAGitRepository { path: req.repository_path.display().to_string() });
        }
        if !branch_resolves(&req.repository_path, &req.base_branch).await {
            return Err(WorktreeError::BaseBranchUnresolved { path: req.repository_path.display().to_string(), base_branch: req.base_branch.clone() });
        }

        let lock = self.repo_lock(&req.repository_path);
        let _guard = lock.lock().await;

        let current_count = self.store.list_worktrees_for_repository(&req.repository_id).iter().filter(|w| w.status == WorktreeStatus::Active).count() as u32;
        if current_count >= self.max_per_repo {
            tracing::warn!(repository_id = %req.repository_id, max = self.max_per_repo, "repository at worktree capacity");
            return Err(WorktreeError::RepositoryAtCapacity { repository_id: req.repository_id.to_string(), max: self.max_per_repo });
        }

        let branch = req.branch_name.clone().unwrap_or_else(|| format!("{}{}", self.branch_prefix, req.task_id.suffix()));
        let path = self.base_dir.join(req.task_id.suffix());

        run_worktree_add(&req.repository_path, &path, &branch, &req.base_branch).await?;
        tracing::info!(task_id = %req.task_id, branch, path = %path.display(), "worktree created");

        let worktree = Worktree {
            id: WorktreeId::new(),
            task_id: req.task_id,
            repository_id: req.repository_id,
            repository_path: req.repository_path.display().to_string(),
            path: path.display().to_string(),
            branch,
            base_branch: req.base_branch,
            status: WorktreeStatus::Active,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            merged_at_ms: None,
            deleted_at_ms: None,
        };
        self.store.upsert_worktree(worktree.clone())?;
        Ok(worktree)
    }

    pub fn get_by_task_id(&self, task_id: &TaskId) -> Option<Worktree> {
        self.store.get_worktree_by_task(task_id)
    }

    pub fn is_valid(&self, worktree: &Worktree) -> bool {
        is_valid_worktree_dir(Path::new(&worktree.path))
    }

    pub async fn remove(&self, task_id: &TaskId, remove_branch: bool, now_ms: u64) -> Result<(), WorktreeError> {
        let worktree = self.get_by_task_id(task_id).ok_or_else(|| WorktreeError::NotFound(task_id.to_string()))?;
        let repo_path = PathBuf::from(&worktree.repository_path);
        let lock = self.repo_lock(&repo_path);
        let _guard = lock.lock().await;

        remove_worktree_with_fallback(&repo_path, Path::new(&worktree.path)).await;
        if remove_branch {
            let _ = run_git(&repo_path, ["branch", "-D", &worktree.branch]).await;
        }

        self.store.delete_worktree(&worktree.id, now_ms)?;
        tracing::info!(task_id = %task_id, worktree_id = %worktree.id, "worktree removed");
        Ok(())
    }

    /// Used when the record exists but the directory vanished underneath it:
    /// prune stale state and re-add using the existing branch.
    pub async fn recreate(&self, existing: &Worktree) -> Result<(), WorktreeError> {
        let repo_path = PathBuf::from(&existing.repository_path);
        let path = Path::new(&existing.path);
        let lock = self.repo_lock(&repo_path);
        let _guard = lock.lock().await;

        if path.exists() {
            let _ = tokio::fs::remove_dir_all(path).await;
        }
        let _ = run_git(&repo_path, ["worktree", "prune"]).await;
        run_worktree_add(&repo_path, path, &existing.branch, &existing.base_branch).await
    }

    /// Delete any child of the worktree base directory whose name is not an
    /// active task id.
    pub async fn reconcile(&self, active_task_ids: &[TaskId]) -> Result<(), WorktreeError> {
        let active: std::collections::HashSet<&str> = active_task_ids.iter().map(|id| id.suffix()).collect();
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(WorktreeError::Io(e)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(WorktreeError::Io)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !active.contains(name.as_ref()) {
                let _ = tokio::fs::remove_dir_all(entry.path()).await;
            }
        }
        Ok(())
    }
}

async fn branch_resolves(repo_path: &Path, branch: &str) -> bool {
    run_git(repo_path, ["rev-parse", "--verify", branch]).await.map(|o| o.status.success()).unwrap_or(false)
}

async fn run_worktree_add(repo_path: &Path, path: &Path, branch: &str, base: &str) -> Result<(), WorktreeError> {
    let output = run_git(repo_path, ["worktree", "add", "-b", branch, &path.display().to_string(), base]).await?;
    if output.status.success() {
        return Ok(());
    }
    // Branch may already exist; retry without creating it.
    let retry = run_git(repo_path, ["worktree", "add", &path.display().to_string(), branch]).await?;
    if retry.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&retry.stderr).trim().to_string();
    rollback_failed_add(repo_path, path).await;
    Err(WorktreeError::GitCommand(format!("git worktree add failed: {stderr}")))
}

async fn rollback_failed_add(repo_path: &Path, path: &Path) {
    remove_worktree_with_fallback(repo_path, path).await;
}

/// Best-effort teardown chain: `git worktree remove --force`, falling back
/// to `rm -rf`, then `git worktree prune` to drop the dangling admin entry.
async fn remove_worktree_with_fallback(repo_path: &Path, path: &Path) {
    let removed = run_git(repo_path, ["worktree", "remove", "--force", &path.display().to_string()]).await.map(|o| o.status.success()).unwrap_or(false);
    if !removed && path.exists() {
        let _ = tokio::fs::remove_dir_all(path).await;
    }
    let _ = run_git(repo_path, ["worktree", "prune"]).await;
}

async fn run_git<I, S>(repo_path: &Path, args: I) -> Result<std::process::Output, WorktreeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_path).args(args).env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    tokio::time::timeout(GIT_WORKTREE_TIMEOUT, cmd.output()).await.map_err(|_| WorktreeError::GitCommand("git invocation timed out".into()))?.map_err(WorktreeError::Io)
}

#[cfg(test)]
#[path = "worktree_manager_tests.rs"]
mod tests;
