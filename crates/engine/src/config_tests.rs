// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn empty_document_uses_defaults() {
    let config = DaemonConfig::from_toml_str("").unwrap();
    assert_eq!(config.branch_prefix, DEFAULT_BRANCH_PREFIX);
    assert_eq!(config.max_worktrees_per_repo, DEFAULT_MAX_WORKTREES_PER_REPO);
    assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
}

#[test]
fn overrides_take_effect() {
    let toml = r#"
        worktree_base_path = "/var/lib/conductor/worktrees"
        branch_prefix = "agent/"
        max_worktrees_per_repo = 16
        event_channel_capacity = 256
        health_check_timeout_secs = 30
    "#;
    let config = DaemonConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.worktree_base_path, PathBuf::from("/var/lib/conductor/worktrees"));
    assert_eq!(config.branch_prefix, "agent/");
    assert_eq!(config.max_worktrees_per_repo, 16);
    assert_eq!(config.event_channel_capacity, 256);
    assert_eq!(config.health_check_timeout(), Duration::from_secs(30));
}

#[test]
fn env_var_overrides_expand_before_parsing() {
    std::env::set_var("OJ_TEST_BRANCH_PREFIX", "from-env/");
    let toml = r#"branch_prefix = "${OJ_TEST_BRANCH_PREFIX:-fallback/}""#;
    let config = DaemonConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.branch_prefix, "from-env/");
    std::env::remove_var("OJ_TEST_BRANCH_PREFIX");
}

#[test]
fn env_var_falls_back_to_default_when_unset() {
    std::env::remove_var("OJ_TEST_UNSET_VAR");
    let toml = r#"branch_prefix = "${OJ_TEST_UNSET_VAR:-fallback/}""#;
    let config = DaemonConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.branch_prefix, "fallback/");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = DaemonConfig::from_toml_str("max_worktrees_per_repo = \"not-a-number\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conductor.toml");
    std::fs::write(&path, "max_worktrees_per_repo = 3\n").unwrap();
    let config = DaemonConfig::load(&path).unwrap();
    assert_eq!(config.max_worktrees_per_repo, 3);
}

#[test]
fn load_missing_file_is_an_io_error() {
    let err = DaemonConfig::load(Path::new("/nonexistent/conductor.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
