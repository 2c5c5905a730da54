// SPDX-License-Identifier: MIT

//! Discovery probes: pure checks deciding whether an agent binary is
//! installed, executed against the declarative [`ProbeSpec`] shapes defined
//! in `conductor-core`.

use conductor_core::ProbeSpec;
use regex::Regex;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid probe pattern {0:?}: {1}")]
    Pattern(String, regex::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub available: bool,
    pub matched_path: Option<String>,
}

impl ProbeResult {
    fn found(matched_path: impl Into<String>) -> Self {
        Self { available: true, matched_path: Some(matched_path.into()) }
    }

    fn not_found() -> Self {
        Self { available: false, matched_path: None }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn path_dirs() -> Vec<PathBuf> {
    std::env::var_os("PATH").map(|p| std::env::split_paths(&p).collect()).unwrap_or_default()
}

fn find_in_path(name: &str) -> Option<String> {
    path_dirs().into_iter().map(|dir| dir.join(name)).find(|candidate| candidate.is_file()).map(|p| p.to_string_lossy().into_owned())
}

/// Run a single probe, returning the matched path on success.
pub fn run_probe(probe: &ProbeSpec) -> Result<Option<String>, ProbeError> {
    match probe {
        ProbeSpec::FileExists { paths } => {
            for raw in paths {
                let expanded = expand_home(raw);
                if expanded.exists() {
                    return Ok(Some(expanded.to_string_lossy().into_owned()));
                }
            }
            Ok(None)
        }
        ProbeSpec::CommandInPath { name } => Ok(find_in_path(name)),
        ProbeSpec::CommandOutputMatches { name, args, pattern } => {
            let re = Regex::new(pattern).map_err(|e| ProbeError::Pattern(pattern.clone(), e))?;
            let output = match std::process::Command::new(name).args(args).output() {
                Ok(out) => out,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(name, "probe binary not found");
                    return Ok(None);
                }
                Err(e) => return Err(ProbeError::Io(e)),
            };
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            Ok(re.is_match(&combined).then(|| name.clone()))
        }
        ProbeSpec::EnvVarSet { name } => Ok(std::env::var(name).ok().map(|_| name.clone())),
    }
}

/// Return the first matching probe's result; `{available: false}` if none
/// match. Probe execution errors (bad regex, unexpected I/O failure) abort
/// detection immediately rather than being swallowed.
pub fn detect(probes: &[ProbeSpec]) -> Result<ProbeResult, ProbeError> {
    for probe in probes {
        if let Some(matched) = run_probe(probe)? {
            return Ok(ProbeResult::found(matched));
        }
    }
    Ok(ProbeResult::not_found())
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
