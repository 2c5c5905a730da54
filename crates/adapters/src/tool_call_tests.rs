// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

#[test]
fn bash_tool_maps_to_shell_exec() {
    let input = json!({"command": "cargo test", "cwd": "/repo", "background": false});
    let payload = normalize_tool_input("Bash", &input);
    match payload {
        NormalizedPayload::ShellExec { command, cwd, background, .. } => {
            assert_eq!(command, "cargo test");
            assert_eq!(cwd.as_deref(), Some("/repo"));
            assert!(!background);
        }
        _ => panic!("expected ShellExec"),
    }
}

#[test]
fn write_tool_maps_to_modify_file_with_one_mutation() {
    let input = json!({"file_path": "src/lib.rs", "diff": "+fn x() {}"});
    let payload = normalize_tool_input("Write", &input);
    match payload {
        NormalizedPayload::ModifyFile { path, mutations } => {
            assert_eq!(path, "src/lib.rs");
            assert_eq!(mutations.len(), 1);
            assert_eq!(mutations[0].diff.as_deref(), Some("+fn x() {}"));
        }
        _ => panic!("expected ModifyFile"),
    }
}

#[test]
fn read_tool_maps_to_read_file() {
    let input = json!({"path": "README.md", "offset": 10, "limit": 50});
    let payload = normalize_tool_input("read", &input);
    match payload {
        NormalizedPayload::ReadFile { path, offset, limit, .. } => {
            assert_eq!(path, "README.md");
            assert_eq!(offset, Some(10));
            assert_eq!(limit, Some(50));
        }
        _ => panic!("expected ReadFile"),
    }
}

#[test]
fn unknown_tool_falls_back_to_generic_with_raw_input_preserved() {
    let input = json!({"whatever": 1});
    let payload = normalize_tool_input("some_future_tool", &input);
    match payload {
        NormalizedPayload::Generic { tool_name, raw_input } => {
            assert_eq!(tool_name, "some_future_tool");
            assert_eq!(raw_input, input);
        }
        _ => panic!("expected Generic"),
    }
}

#[test]
fn attach_search_results_strips_truncation_banner() {
    let payload = normalize_tool_input("grep", &json!({"pattern": "TODO"}));
    let payload = attach_search_results(payload, "a.rs\nb.rs\n... 12 more\n");
    match payload {
        NormalizedPayload::CodeSearch { file_count, truncated, .. } => {
            assert_eq!(file_count, 2);
            assert!(truncated);
        }
        _ => panic!("expected CodeSearch"),
    }
}
