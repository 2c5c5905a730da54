// SPDX-License-Identifier: MIT

//! Permission schema types contributed by an `Agent` catalog entry.

use serde::{Deserialize, Serialize};

/// How a permission setting is communicated to the agent subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMethod {
    /// Rendered as a CLI flag at spawn time.
    CliFlag,
    /// Sent over the protocol's stdio channel at runtime.
    Stdio,
    /// Negotiated as part of the ACP handshake.
    Acp,
    /// Exported as an environment variable at spawn time.
    Env,
    /// Adapter-specific; no generic handling.
    Custom,
}

/// One entry in an agent's permission schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSetting {
    /// Stable key identifying this setting (also used as the user-value lookup key).
    pub label: String,
    pub description: String,
    pub supported: bool,
    pub default_value: bool,
    pub apply_method: ApplyMethod,
    /// Literal flag string, required when `apply_method == CliFlag`.
    pub cli_flag: Option<String>,
    /// Optional literal value appended after the flag. When absent, the flag
    /// string itself is split on whitespace and appended as-is.
    pub cli_flag_value: Option<String>,
}

impl PermissionSetting {
    pub fn cli_flag(label: impl Into<String>, flag: impl Into<String>, default_value: bool) -> Self {
        Self {
            label: label.into(),
            description: String::new(),
            supported: true,
            default_value,
            apply_method: ApplyMethod::CliFlag,
            cli_flag: Some(flag.into()),
            cli_flag_value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.cli_flag_value = Some(value.into());
        self
    }

    pub fn unsupported(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: String::new(),
            supported: false,
            default_value: false,
            apply_method: ApplyMethod::Custom,
            cli_flag: None,
            cli_flag_value: None,
        }
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
