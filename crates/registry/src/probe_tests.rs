// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn file_exists_matches_first_present_path() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("binary");
    std::fs::write(&present, b"").unwrap();
    let probe = ProbeSpec::FileExists {
        paths: vec![
            dir.path().join("missing").to_string_lossy().into_owned(),
            present.to_string_lossy().into_owned(),
        ],
    };
    let result = detect(&[probe]).unwrap();
    assert!(result.available);
    assert_eq!(result.matched_path.unwrap(), present.to_string_lossy());
}

#[test]
fn detect_reports_unavailable_when_nothing_matches() {
    let probe = ProbeSpec::EnvVarSet { name: "OJ_PROBE_TEST_VAR_DEFINITELY_UNSET".to_string() };
    let result = detect(&[probe]).unwrap();
    assert!(!result.available);
    assert!(result.matched_path.is_none());
}

#[test]
fn detect_returns_first_match_and_skips_the_rest() {
    let probes = vec![
        ProbeSpec::EnvVarSet { name: "OJ_PROBE_TEST_VAR_DEFINITELY_UNSET".to_string() },
        ProbeSpec::CommandInPath { name: "sh".to_string() },
        ProbeSpec::CommandInPath { name: "this-binary-does-not-exist-anywhere".to_string() },
    ];
    let result = detect(&probes).unwrap();
    assert!(result.available);
}

#[test]
fn command_output_matches_checks_combined_stdout_and_stderr() {
    let probe = ProbeSpec::CommandOutputMatches {
        name: "sh".to_string(),
        args: vec!["-c".to_string(), "echo hello-world".to_string()],
        pattern: "hello-\\w+".to_string(),
    };
    let result = detect(&[probe]).unwrap();
    assert!(result.available);
}

#[yare::parameterized(
    unset_var = { "OJ_PROBE_TEST_VAR_DEFINITELY_UNSET" },
    empty_name = { "" },
)]
fn env_var_set_reports_unavailable_when_absent(name: &str) {
    let probe = ProbeSpec::EnvVarSet { name: name.to_string() };
    let result = detect(&[probe]).unwrap();
    assert!(!result.available);
}

#[test]
fn invalid_regex_pattern_propagates_as_an_error() {
    let probe = ProbeSpec::CommandOutputMatches {
        name: "sh".to_string(),
        args: vec![],
        pattern: "(unclosed".to_string(),
    };
    assert!(detect(&[probe]).is_err());
}
