// SPDX-License-Identifier: MIT

//! Fluent, order-preserving argv composition.
//!
//! A [`Command`] is an ordered sequence of already-tokenized argv fragments.
//! A [`Param`] is a reusable sub-sequence (a flag plus an optional value
//! template carrying `{model}` / `{prompt}` placeholders) attached to an
//! `Agent`'s `RuntimeConfig`. Every builder method is a no-op when its
//! gating condition is false (empty flag or empty value) — this is the
//! universal invariant the whole module is built to satisfy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reusable argv fragment: a flag (e.g. `["--model"]`) with optional
/// placeholder substitution performed when it's applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub args: Vec<String>,
}

impl Param {
    pub fn new(args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { args: args.into_iter().map(Into::into).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Replace every occurrence of `placeholder` in every argument with `value`.
    fn substitute(&self, placeholder: &str, value: &str) -> Vec<String> {
        self.args.iter().map(|a| a.replace(placeholder, value)).collect()
    }
}

/// Options controlling permission-flag emission.
#[derive(Debug, Clone, Default)]
pub struct PermissionOptions {
    pub auto_approve: bool,
}

/// An ordered, already-tokenized argv sequence. Value type: every builder
/// method returns a new `Command`, never mutates its receiver in place for
/// callers holding a shared seed (`with` clones first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    args: Vec<String>,
}

impl Command {
    /// Start a command from a base argv (e.g. `["npx", "-y", "pkg@1.0", "--acp"]`).
    pub fn new(base: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { args: base.into_iter().map(Into::into).collect() }
    }

    /// Clone this command into a fresh builder. Builders never mutate their seed.
    pub fn with(&self) -> Self {
        self.clone()
    }

    fn push_all(mut self, items: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(items);
        self
    }

    /// Append `flag.args` with every `{model}` substring replaced by `model`.
    /// No-op if `flag` or `model` is empty.
    pub fn model(self, flag: &Param, model: &str) -> Self {
        if flag.is_empty() || model.is_empty() {
            return self;
        }
        let substituted = flag.substitute("{model}", model);
        self.push_all(substituted)
    }

    /// Append `flag.args` then `session_id` verbatim.
    /// No-op if `session_id` is empty, `native_resume` is true, or `flag` is empty.
    pub fn resume(self, flag: &Param, session_id: &str, native_resume: bool) -> Self {
        if session_id.is_empty() || native_resume || flag.is_empty() {
            return self;
        }
        let mut items = flag.args.clone();
        items.push(session_id.to_string());
        self.push_all(items)
    }

    /// Append `flag.args` then `message_uuid` verbatim. Empty inputs are no-ops.
    pub fn resume_at(self, flag: &Param, message_uuid: &str) -> Self {
        if message_uuid.is_empty() || flag.is_empty() {
            return self;
        }
        let mut items = flag.args.clone();
        items.push(message_uuid.to_string());
        self.push_all(items)
    }

    /// When `opts.auto_approve` is false and both `flag` and `tools` are
    /// non-empty, append `flag, "<tool>:ask-user"` for each tool.
    pub fn permissions(self, flag: &Param, tools: &[String], opts: &PermissionOptions) -> Self {
        if opts.auto_approve || flag.is_empty() || tools.is_empty() {
            return self;
        }
        let mut cmd = self;
        for tool in tools {
            cmd = cmd.push_all(flag.args.clone());
            cmd.args.push(format!("{}:ask-user", tool));
        }
        cmd
    }

    /// Apply a permission schema: for each supported, `cli_flag`-applied
    /// setting whose user value is `true`, append either the literal
    /// `cli_flag_value` or the flag string split on whitespace.
    pub fn settings(
        self,
        settings: &[crate::permission::PermissionSetting],
        values: &HashMap<String, bool>,
    ) -> Self {
        let mut cmd = self;
        for setting in settings {
            if !setting.supported || setting.apply_method != crate::permission::ApplyMethod::CliFlag {
                continue;
            }
            let enabled = values.get(&setting.label).copied().unwrap_or(setting.default_value);
            if !enabled {
                continue;
            }
            let Some(flag) = &setting.cli_flag else { continue };
            if let Some(value) = &setting.cli_flag_value {
                if !value.is_empty() {
                    cmd.args.push(flag.clone());
                    cmd.args.push(value.clone());
                    continue;
                }
            }
            cmd.args.extend(flag.split_whitespace().map(String::from));
        }
        cmd
    }

    /// Append the prompt. Empty `flag` ⇒ append positionally; otherwise
    /// every `{prompt}` placeholder in `flag.args` is substituted.
    pub fn prompt(self, flag: &Param, prompt: &str) -> Self {
        if prompt.is_empty() {
            return self;
        }
        if flag.is_empty() {
            return self.push_all([prompt.to_string()]);
        }
        let substituted = flag.substitute("{prompt}", prompt);
        self.push_all(substituted)
    }

    /// Append literal argv fragments verbatim.
    pub fn flag(self, parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.push_all(parts.into_iter().map(Into::into))
    }

    /// Freeze the accumulated sequence.
    pub fn build(self) -> Vec<String> {
        self.args
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
