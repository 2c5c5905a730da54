// SPDX-License-Identifier: MIT

//! Demo CLI wiring the registry, adapters, engine, and storage crates
//! together: list known agents, and create/list/remove git worktrees
//! against a real repository.

mod commands;
mod demo_agents;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use conductor_core::{RepositoryId, TaskId};
use conductor_engine::worktree_manager::WorktreeManager;
use conductor_engine::DaemonConfig;
use conductor_registry::AgentRegistry;
use conductor_storage::{InMemorySessionStore, SessionStore};
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conductor", about = "Multi-agent coding orchestrator core, demo CLI")]
struct Cli {
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Path to a TOML config file (worktree base path, branch prefix, etc.).
    /// Falls back to built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in agent catalog, with discovery probe results.
    Agents,
    /// Show the default agent (auggie if present and enabled, else first enabled).
    DefaultAgent,
    #[command(subcommand)]
    Worktree(WorktreeCommands),
    /// Show execution log entries recorded for a task.
    Logs { #[arg(long)] task_id: String },
}

#[derive(Subcommand)]
enum WorktreeCommands {
    /// Create a worktree for a fresh task against an existing git repository.
    Create {
        #[arg(long)] repository_path: PathBuf,
        /// Groups worktrees for `worktree list`; a fresh one is generated if omitted.
        #[arg(long)] repository_id: Option<String>,
        #[arg(long, default_value = "main")] base_branch: String,
        #[arg(long)] branch_name: Option<String>,
    },
    /// List worktrees recorded for a repository.
    List { #[arg(long)] repository_id: String },
    /// Remove the worktree recorded for a task.
    Remove {
        #[arg(long)] task_id: String,
        #[arg(long, default_value_t = false)] remove_branch: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(err) = run().await {
        eprintln!("error: {}", err.message);
        std::process::exit(err.code);
    }
}

async fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DaemonConfig::load(path).map_err(|e| ExitError::new(1, e.to_string()))?,
        None => DaemonConfig::default(),
    };

    let registry = AgentRegistry::new();
    for agent in demo_agents::builtin_agents() {
        registry.register(agent).map_err(|e| ExitError::new(1, e.to_string()))?;
    }
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let worktrees = WorktreeManager::from_config(&config, Arc::clone(&store));

    match cli.command {
        Commands::Agents => commands::list_agents(&registry, cli.format),
        Commands::DefaultAgent => commands::show_default_agent(&registry, cli.format),
        Commands::Worktree(WorktreeCommands::Create { repository_path, repository_id, base_branch, branch_name }) => {
            let repository_id = repository_id.map(RepositoryId::from_string).unwrap_or_else(RepositoryId::new);
            commands::create_worktree(&worktrees, repository_path, repository_id, base_branch, branch_name, cli.format).await.map(|_| ())
        }
        Commands::Worktree(WorktreeCommands::List { repository_id }) => {
            commands::list_worktrees(&store, RepositoryId::from_string(repository_id), cli.format)
        }
        Commands::Worktree(WorktreeCommands::Remove { task_id, remove_branch }) => {
            commands::remove_worktree(&worktrees, TaskId::from_string(task_id), remove_branch).await
        }
        Commands::Logs { task_id } => commands::show_logs(&store, TaskId::from_string(task_id), cli.format),
    }
}
