// SPDX-License-Identifier: MIT

//! Daemon-level configuration: worktree layout, concurrency limits, and
//! timeouts, loaded from a TOML file with `${VAR:-default}` environment
//! overrides expanded before parsing.

use conductor_core::template::expand_env;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BRANCH_PREFIX: &str = "kandev/";
const DEFAULT_MAX_WORKTREES_PER_REPO: u32 = 8;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Mirrors the `worktrees` table in the daemon's TOML config file. Every
/// field has a default, so an empty or absent file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub worktree_base_path: PathBuf,
    pub branch_prefix: String,
    pub max_worktrees_per_repo: u32,
    pub event_channel_capacity: usize,
    pub health_check_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            worktree_base_path: std::env::temp_dir().join("conductor-worktrees"),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            max_worktrees_per_repo: DEFAULT_MAX_WORKTREES_PER_REPO,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            health_check_timeout_secs: DEFAULT_HEALTH_CHECK_TIMEOUT_SECS,
        }
    }
}

impl DaemonConfig {
    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs)
    }

    /// Parse already-expanded TOML text. Missing tables/fields fall back to
    /// [`DaemonConfig::default`].
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&expand_env(contents))?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io { path: path.display().to_string(), source: e })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
