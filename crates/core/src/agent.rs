// SPDX-License-Identifier: MIT

//! Agent catalog entry: identity, discovery, models, permissions, and the
//! runtime template a `conductor-engine` session spawns from.
//!
//! An `Agent` is immutable after registration; `conductor-registry` owns
//! the mutable map from `AgentTypeId` to `Agent`.

use crate::container::ContainerConfig;
use crate::ids::AgentTypeId;
use crate::model::Model;
use crate::permission::PermissionSetting;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pure function, described declaratively, that decides whether an agent
/// binary is installed. Execution lives in `conductor-registry::probe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeSpec {
    FileExists { paths: Vec<String> },
    CommandInPath { name: String },
    CommandOutputMatches { name: String, args: Vec<String>, pattern: String },
    EnvVarSet { name: String },
}

/// Wire protocol dialect an agent speaks, selecting which transport adapter
/// handles its subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolTag {
    Acp,
    StreamJson,
    Codex,
    OpenCode,
}

/// Resource ceilings applied when spawning a containerized agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

/// The spawn-time template for one agent type: command, working directory,
/// required environment, mount templates (`{workspace}`, `{home}`,
/// `{task_id}` placeholders expanded by `conductor-core::template`), and the
/// `Param` fragments the command builder gates on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerConfig>,
    pub command_template: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir_template: Option<String>,
    #[serde(default)]
    pub required_env: Vec<String>,
    #[serde(default)]
    pub mount_templates: Vec<(String, String)>,
    #[serde(default)]
    pub resource_limits: ResourceLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_flag: Option<crate::command::Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_flag: Option<crate::command::Param>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// A registered agent type: identity plus everything `conductor-registry`
/// and `conductor-adapters` need to discover, list, and drive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentTypeId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub discovery_probes: Vec<ProbeSpec>,
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub permissions: Vec<PermissionSetting>,
    #[serde(default)]
    pub supports_passthrough: bool,
    pub runtime: RuntimeConfig,
}

impl Agent {
    /// Build a user-defined TUI agent (passthrough-only) from a slug,
    /// display name, and a whitespace-split command string. When `model` is
    /// supplied and the command contains a `{{model}}` token, substitution
    /// happens eagerly at construction rather than at spawn time.
    pub fn tui_agent(slug: impl Into<String>, display_name: impl Into<String>, command: &str, model: Option<&str>) -> Self {
        let mut parts: Vec<String> = command.split_whitespace().map(String::from).collect();
        if let Some(model) = model {
            for part in &mut parts {
                if part.contains("{{model}}") {
                    *part = part.replace("{{model}}", model);
                }
            }
        }
        let display_name = display_name.into();
        Self {
            id: AgentTypeId::from_string(format!("{}{}", AgentTypeId::PREFIX, slug.into())),
            name: display_name.clone(),
            display_name,
            description: String::new(),
            display_order: i32::MAX,
            enabled: true,
            discovery_probes: Vec::new(),
            models: Vec::new(),
            permissions: Vec::new(),
            supports_passthrough: true,
            runtime: RuntimeConfig { command_template: parts, ..Default::default() },
        }
    }
}

/// Input validation for §6's catalog contract: non-empty id/name, at least
/// one of `image` or a command template, and positive resource figures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentValidationError {
    #[error("agent id must not be empty")]
    EmptyId,
    #[error("agent name must not be empty")]
    EmptyName,
    #[error("agent {0} must set either a container image or a command template")]
    NoLaunchTarget(String),
    #[error("agent {0} resource limit {1} must be positive")]
    NonPositiveLimit(String, &'static str),
}

pub fn validate_agent(agent: &Agent) -> Result<(), AgentValidationError> {
    if agent.id.is_empty() {
        return Err(AgentValidationError::EmptyId);
    }
    if agent.name.is_empty() {
        return Err(AgentValidationError::EmptyName);
    }
    let has_image = agent.runtime.container.is_some();
    let has_cmd = !agent.runtime.command_template.is_empty();
    if !has_image && !has_cmd {
        return Err(AgentValidationError::NoLaunchTarget(agent.name.clone()));
    }
    let limits = &agent.runtime.resource_limits;
    if matches!(limits.memory_mb, Some(0)) {
        return Err(AgentValidationError::NonPositiveLimit(agent.name.clone(), "memory_mb"));
    }
    if matches!(limits.cpu_cores, Some(0)) {
        return Err(AgentValidationError::NonPositiveLimit(agent.name.clone(), "cpu_cores"));
    }
    if matches!(limits.timeout_seconds, Some(0)) {
        return Err(AgentValidationError::NonPositiveLimit(agent.name.clone(), "timeout_seconds"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
