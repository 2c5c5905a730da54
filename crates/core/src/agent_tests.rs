// SPDX-License-Identifier: MIT

use super::*;

fn base_agent() -> Agent {
    Agent {
        id: AgentTypeId::from_string("agt-auggie"),
        name: "auggie".to_string(),
        display_name: "Auggie".to_string(),
        description: String::new(),
        display_order: 0,
        enabled: true,
        discovery_probes: vec![],
        models: vec![],
        permissions: vec![],
        supports_passthrough: false,
        runtime: RuntimeConfig {
            command_template: vec!["npx".into(), "-y".into(), "@augmentcode/auggie".into()],
            ..Default::default()
        },
    }
}

#[test]
fn validate_agent_accepts_command_template_launch_target() {
    assert!(validate_agent(&base_agent()).is_ok());
}

#[test]
fn validate_agent_rejects_empty_id() {
    let mut agent = base_agent();
    agent.id = AgentTypeId::from_string("");
    assert_eq!(validate_agent(&agent), Err(AgentValidationError::EmptyId));
}

#[test]
fn validate_agent_rejects_no_launch_target() {
    let mut agent = base_agent();
    agent.runtime.command_template.clear();
    assert!(matches!(validate_agent(&agent), Err(AgentValidationError::NoLaunchTarget(_))));
}

#[test]
fn validate_agent_accepts_container_image_without_command() {
    let mut agent = base_agent();
    agent.runtime.command_template.clear();
    agent.runtime.container = Some(ContainerConfig::new("coop-claude"));
    assert!(validate_agent(&agent).is_ok());
}

#[test]
fn validate_agent_rejects_zero_memory_limit() {
    let mut agent = base_agent();
    agent.runtime.resource_limits.memory_mb = Some(0);
    assert!(matches!(validate_agent(&agent), Err(AgentValidationError::NonPositiveLimit(_, "memory_mb"))));
}

#[test]
fn tui_agent_substitutes_model_template_eagerly() {
    let agent = Agent::tui_agent("claude-tui", "Claude TUI", "claude --model {{model}}", Some("sonnet4.5"));
    assert_eq!(agent.runtime.command_template, vec!["claude", "--model", "sonnet4.5"]);
}

#[test]
fn tui_agent_leaves_template_untouched_without_a_model() {
    let agent = Agent::tui_agent("claude-tui", "Claude TUI", "claude --model {{model}}", None);
    assert_eq!(agent.runtime.command_template, vec!["claude", "--model", "{{model}}"]);
}
