// SPDX-License-Identifier: MIT

//! Placeholder interpolation for runtime config templates and config files.
//!
//! Two distinct substitution grammars are used in this crate:
//! - `{name}` placeholders in `RuntimeConfig` templates (`{workspace}`, `{home}`,
//!   `{task_id}`) and in `Param` value templates (`{model}`, `{prompt}`).
//! - `${VAR:-default}` environment-variable expansion in daemon-level TOML config.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static ENV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+):-([^}]*)\}").expect("constant regex pattern is valid"));

/// Replace every `{name}` placeholder present in `vars`. Unknown placeholders
/// are left as-is.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Expand `${VAR:-default}` references against the process environment.
/// Used when loading daemon-level TOML configuration.
pub fn expand_env(s: &str) -> String {
    ENV_PATTERN
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = &caps[2];
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .to_string()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
