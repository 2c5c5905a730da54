// SPDX-License-Identifier: MIT

//! Command handlers: each takes its parsed `clap` arguments plus the shared
//! registry/engine/store handles and returns `Result<(), ExitError>`.

use crate::exit_error::ExitError;
use crate::output::{print_rows, print_value, OutputFormat};
use anyhow::Context;
use conductor_core::{Command as Argv, RepositoryId, TaskId, WorktreeStatus};
use conductor_engine::worktree_manager::{CreateWorktreeRequest, WorktreeManager};
use conductor_registry::{probe, AgentRegistry};
use conductor_storage::SessionStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[derive(Serialize)]
struct AgentRow {
    id: String,
    name: String,
    enabled: bool,
    available: bool,
    preview_argv: Vec<String>,
}

/// List every registered agent, running its discovery probes and previewing
/// the argv a session launch would compose for it.
pub fn list_agents(registry: &AgentRegistry, format: OutputFormat) -> Result<(), ExitError> {
    let rows: Vec<AgentRow> = registry
        .list()
        .into_iter()
        .map(|agent| {
            let available = probe::detect(&agent.discovery_probes).map(|r| r.available).unwrap_or(false);
            let mut argv = Argv::new(agent.runtime.command_template.clone());
            if let (Some(flag), Some(model)) = (&agent.runtime.model_flag, agent.models.first()) {
                argv = argv.model(flag, &model.id);
            }
            AgentRow { id: agent.id.to_string(), name: agent.display_name.clone(), enabled: agent.enabled, available, preview_argv: argv.build() }
        })
        .collect();
    print_rows(&rows, format, |row| format!("{:<14} {:<20} enabled={:<5} available={:<5} argv={:?}", row.id, row.name, row.enabled, row.available, row.preview_argv)).map_err(ExitError::from)
}

pub fn show_default_agent(registry: &AgentRegistry, format: OutputFormat) -> Result<(), ExitError> {
    let agent = registry.get_default().map_err(|e| ExitError::new(1, e.to_string()))?;
    print_value(&agent, format, |a| format!("{} ({})", a.display_name, a.id)).map_err(ExitError::from)
}

#[derive(Serialize)]
struct WorktreeRow {
    id: String,
    task_id: String,
    branch: String,
    path: String,
    status: WorktreeStatus,
}

fn row(w: &conductor_core::Worktree) -> WorktreeRow {
    WorktreeRow { id: w.id.to_string(), task_id: w.task_id.to_string(), branch: w.branch.clone(), path: w.path.clone(), status: w.status }
}

pub async fn create_worktree(
    manager: &WorktreeManager,
    repository_path: PathBuf,
    repository_id: RepositoryId,
    base_branch: String,
    branch_name: Option<String>,
    format: OutputFormat,
) -> Result<conductor_core::Worktree, ExitError> {
    let repository_path = repository_path.canonicalize().context("resolving repository path").map_err(ExitError::from)?;
    let req = CreateWorktreeRequest { task_id: TaskId::new(), repository_id, repository_path, base_branch, branch_name };
    let worktree = manager.create(req, now_ms()).await.map_err(|e| ExitError::new(1, e.to_string()))?;
    print_value(&row(&worktree), format, |r| format!("created {} at {} ({})", r.id, r.path, r.branch)).map_err(ExitError::from)?;
    Ok(worktree)
}

pub fn list_worktrees(store: &Arc<dyn SessionStore>, repository_id: RepositoryId, format: OutputFormat) -> Result<(), ExitError> {
    let rows: Vec<WorktreeRow> = store.list_worktrees_for_repository(&repository_id).iter().map(row).collect();
    print_rows(&rows, format, |r| format!("{:<24} {:<10} {:<30} {:?}", r.id, r.task_id, r.branch, r.status)).map_err(ExitError::from)
}

pub async fn remove_worktree(manager: &WorktreeManager, task_id: TaskId, remove_branch: bool) -> Result<(), ExitError> {
    manager.remove(&task_id, remove_branch, now_ms()).await.map_err(|e| ExitError::new(1, e.to_string()))?;
    println!("removed worktree for task {task_id}");
    Ok(())
}

pub fn show_logs(store: &Arc<dyn SessionStore>, task_id: TaskId, format: OutputFormat) -> Result<(), ExitError> {
    let logs = store.logs_for_task(&task_id);
    print_rows(&logs, format, |l| format!("[{}] {:?} {} {}", l.timestamp_ms, l.log_level, l.message_type, l.message)).map_err(ExitError::from)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
