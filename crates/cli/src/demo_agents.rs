// SPDX-License-Identifier: MIT

//! Built-in agent catalog registered at startup, standing in for the
//! `agents.json` document a real deployment would load via
//! `conductor_registry::load_and_register`.

use conductor_core::{Agent, AgentTypeId, Param, ProbeSpec, ProtocolTag, RuntimeConfig};

fn entry(slug: &str, display_name: &str, display_order: i32, protocol: ProtocolTag, command_template: &[&str], discovery_binary: &str) -> Agent {
    Agent {
        id: AgentTypeId::from_string(format!("{}{}", AgentTypeId::PREFIX, slug)),
        name: slug.to_string(),
        display_name: display_name.to_string(),
        description: String::new(),
        display_order,
        enabled: true,
        discovery_probes: vec![ProbeSpec::CommandInPath { name: discovery_binary.to_string() }],
        models: Vec::new(),
        permissions: Vec::new(),
        supports_passthrough: true,
        runtime: RuntimeConfig {
            command_template: command_template.iter().map(|s| s.to_string()).collect(),
            protocol: Some(protocol),
            model_flag: Some(Param::new(["--model", "{model}"])),
            workspace_flag: Some(Param::new(["--cwd"])),
            ..Default::default()
        },
    }
}

/// The default catalog: one agent per supported transport dialect.
pub fn builtin_agents() -> Vec<Agent> {
    vec![
        entry("claude-code", "Claude Code", 0, ProtocolTag::StreamJson, &["claude"], "claude"),
        entry("auggie", "Auggie", 1, ProtocolTag::Acp, &["auggie", "--acp"], "auggie"),
        entry("codex", "Codex", 2, ProtocolTag::Codex, &["codex", "app-server"], "codex"),
        entry("opencode", "OpenCode", 3, ProtocolTag::OpenCode, &["opencode"], "opencode"),
    ]
}
