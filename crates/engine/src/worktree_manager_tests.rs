// SPDX-License-Identifier: MIT

use super::*;
use conductor_core::{RepositoryId, TaskId};
use std::process::Command as StdCommand;
use conductor_storage::InMemorySessionStore;
use tempfile::tempdir;

fn init_repo(dir: &Path) {
    let run = |args: &[&str]| {
        let status = StdCommand::new("git").arg("-C").arg(dir).args(args).status().unwrap();
        assert!(status.success(), "git {:?} failed", args);
    };
    run(&["init", "-q", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    std::fs::write(dir.join("README.md"), "hi").unwrap();
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "init"]);
}

#[tokio::test]
async fn create_rejects_non_git_directory() {
    let repo = tempdir().unwrap();
    let base = tempdir().unwrap();
    let manager = WorktreeManager::new(base.path(), Arc::new(InMemorySessionStore::new()));
    let req = CreateWorktreeRequest {
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        repository_path: repo.path().to_path_buf(),
        base_branch: "main".into(),
        branch_name: None,
    };
    let err = manager.create(req, 1).await.unwrap_err();
    assert!(matches!(err, WorktreeError::NotAGitRepository { .. }));
}

#[tokio::test]
async fn create_rejects_unresolved_base_branch() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let base = tempdir().unwrap();
    let manager = WorktreeManager::new(base.path(), Arc::new(InMemorySessionStore::new()));
    let req = CreateWorktreeRequest {
        task_id: TaskId::new(),
        repository_id: RepositoryId::new(),
        repository_path: repo.path().to_path_buf(),
        base_branch: "does-not-exist".into(),
        branch_name: None,
    };
    let err = manager.create(req, 1).await.unwrap_err();
    assert!(matches!(err, WorktreeError::BaseBranchUnresolved { .. }));
}

#[tokio::test]
async fn create_then_is_valid_then_remove() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let base = tempdir().unwrap();
    let manager = WorktreeManager::new(base.path(), Arc::new(InMemorySessionStore::new()));
    let task_id = TaskId::new();
    let req = CreateWorktreeRequest {
        task_id,
        repository_id: RepositoryId::new(),
        repository_path: repo.path().to_path_buf(),
        base_branch: "main".into(),
        branch_name: None,
    };
    let worktree = manager.create(req, 1).await.unwrap();
    assert!(manager.is_valid(&worktree));
    assert_eq!(manager.get_by_task_id(&task_id).unwrap().status, WorktreeStatus::Active);

    manager.remove(&task_id, true, 2).await.unwrap();
    assert!(!Path::new(&worktree.path).exists());
    assert_eq!(manager.get_by_task_id(&task_id).unwrap().status, WorktreeStatus::Deleted);
}

#[tokio::test]
async fn from_config_uses_configured_branch_prefix_and_cap() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let base = tempdir().unwrap();
    let config = DaemonConfig { worktree_base_path: base.path().to_path_buf(), branch_prefix: "agent/".into(), max_worktrees_per_repo: 1, ..DaemonConfig::default() };
    let manager = WorktreeManager::from_config(&config, Arc::new(InMemorySessionStore::new()));
    let repository_id = RepositoryId::new();

    let first = CreateWorktreeRequest { task_id: TaskId::new(), repository_id, repository_path: repo.path().to_path_buf(), base_branch: "main".into(), branch_name: None };
    let worktree = manager.create(first, 1).await.unwrap();
    assert!(worktree.branch.starts_with("agent/"));

    let second = CreateWorktreeRequest { task_id: TaskId::new(), repository_id, repository_path: repo.path().to_path_buf(), base_branch: "main".into(), branch_name: None };
    let err = manager.create(second, 2).await.unwrap_err();
    assert!(matches!(err, WorktreeError::RepositoryAtCapacity { .. }));
}

#[tokio::test]
async fn repository_at_capacity_is_rejected() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let base = tempdir().unwrap();
    let manager = WorktreeManager::new(base.path(), Arc::new(InMemorySessionStore::new())).with_max_per_repo(1);
    let repository_id = RepositoryId::new();

    let first = CreateWorktreeRequest { task_id: TaskId::new(), repository_id, repository_path: repo.path().to_path_buf(), base_branch: "main".into(), branch_name: None };
    manager.create(first, 1).await.unwrap();

    let second = CreateWorktreeRequest { task_id: TaskId::new(), repository_id, repository_path: repo.path().to_path_buf(), base_branch: "main".into(), branch_name: None };
    let err = manager.create(second, 2).await.unwrap_err();
    assert!(matches!(err, WorktreeError::RepositoryAtCapacity { .. }));
}

#[tokio::test]
async fn reconcile_removes_orphaned_directories() {
    let base = tempdir().unwrap();
    let active = TaskId::new();
    std::fs::create_dir_all(base.path().join(active.suffix())).unwrap();
    std::fs::create_dir_all(base.path().join("orphan")).unwrap();
    let manager = WorktreeManager::new(base.path(), Arc::new(InMemorySessionStore::new()));

    manager.reconcile(&[active]).await.unwrap();

    assert!(base.path().join(active.suffix()).exists());
    assert!(!base.path().join("orphan").exists());
}
