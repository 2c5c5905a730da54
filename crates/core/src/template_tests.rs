// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn interpolate_replaces_known_placeholders() {
    let mut vars = HashMap::new();
    vars.insert("workspace".to_string(), "/repo/wt-1".to_string());
    vars.insert("task_id".to_string(), "tsk-abc".to_string());
    let out = interpolate("{workspace}/.agent/{task_id}", &vars);
    assert_eq!(out, "/repo/wt-1/.agent/tsk-abc");
}

#[test]
fn interpolate_leaves_unknown_placeholders_untouched() {
    let vars = HashMap::new();
    let out = interpolate("{home}/.config", &vars);
    assert_eq!(out, "{home}/.config");
}

#[test]
fn expand_env_uses_default_when_unset() {
    let out = expand_env("${OJ_TEST_VAR_NOT_SET:-fallback}");
    assert_eq!(out, "fallback");
}

#[test]
fn expand_env_prefers_process_environment() {
    std::env::set_var("OJ_TEMPLATE_TEST_VAR", "from-env");
    let out = expand_env("${OJ_TEMPLATE_TEST_VAR:-fallback}");
    std::env::remove_var("OJ_TEMPLATE_TEST_VAR");
    assert_eq!(out, "from-env");
}
