// SPDX-License-Identifier: MIT

//! Dialect-independent tool-call payload, tagged by `kind`.
//!
//! Construction is funnelled through the factory functions below; fields are
//! `pub(crate)` so callers outside this crate can only build a payload
//! through a factory and read it back through accessors, matching the
//! "no direct field mutation" contract in the component design.

use serde::{Deserialize, Serialize};

/// One file mutation inside a `modify_file` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Replace,
    Patch,
    Delete,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMutation {
    pub path: String,
    pub kind: MutationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Dialect-independent tool invocation, normalized from each transport
/// adapter's wire-specific tool schema. Exactly one variant is populated per
/// value; round-tripping through serde preserves `kind` and every populated
/// field.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedPayload {
    ReadFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_count: Option<u32>,
        #[serde(default)]
        truncated: bool,
    },
    ModifyFile {
        path: String,
        mutations: Vec<FileMutation>,
    },
    ShellExec {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_seconds: Option<u32>,
        #[serde(default)]
        background: bool,
        #[serde(default)]
        output: ShellOutput,
    },
    CodeSearch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        glob: Option<String>,
        #[serde(default)]
        file_count: u32,
        #[serde(default)]
        truncated: bool,
    },
    HttpRequest {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
    },
    CreateTask {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    SubagentTask {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subagent_type: Option<String>,
    },
    ShowPlan {
        entries: Vec<String>,
    },
    ManageTodos {
        items: Vec<String>,
    },
    Misc {
        label: String,
        #[serde(default)]
        raw: serde_json::Value,
    },
    Generic {
        tool_name: String,
        raw_input: serde_json::Value,
    },
}

impl NormalizedPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "read_file",
            Self::ModifyFile { .. } => "modify_file",
            Self::ShellExec { .. } => "shell_exec",
            Self::CodeSearch { .. } => "code_search",
            Self::HttpRequest { .. } => "http_request",
            Self::CreateTask { .. } => "create_task",
            Self::SubagentTask { .. } => "subagent_task",
            Self::ShowPlan { .. } => "show_plan",
            Self::ManageTodos { .. } => "manage_todos",
            Self::Misc { .. } => "misc",
            Self::Generic { .. } => "generic",
        }
    }

    pub fn read_file(path: impl Into<String>, offset: Option<u32>, limit: Option<u32>) -> Self {
        Self::ReadFile { path: path.into(), offset, limit, content: None, line_count: None, truncated: false }
    }

    /// Attach the read result. `line_count` is computed from `content` when absent.
    pub fn with_read_result(mut self, content: impl Into<String>, truncated: bool) -> Self {
        let content = content.into();
        if let Self::ReadFile { content: c, line_count, truncated: t, .. } = &mut self {
            let lines = content.matches('\n').count() as u32 + 1;
            *c = Some(content);
            *line_count = Some(lines);
            *t = truncated;
        }
        self
    }

    pub fn modify_file(path: impl Into<String>, mutations: Vec<FileMutation>) -> Self {
        Self::ModifyFile { path: path.into(), mutations }
    }

    pub fn shell_exec(command: impl Into<String>, cwd: Option<String>, background: bool) -> Self {
        Self::ShellExec {
            command: command.into(),
            cwd,
            description: None,
            timeout_seconds: None,
            background,
            output: ShellOutput::default(),
        }
    }

    pub fn with_shell_output(mut self, output: ShellOutput) -> Self {
        if let Self::ShellExec { output: o, .. } = &mut self {
            *o = output;
        }
        self
    }

    pub fn code_search(
        query: Option<String>,
        pattern: Option<String>,
        path: Option<String>,
        glob: Option<String>,
    ) -> Self {
        Self::CodeSearch { query, pattern, path, glob, file_count: 0, truncated: false }
    }

    /// Parse a newline-separated result list, stripping a trailing truncation
    /// banner line (one starting with `...`) and counting the remaining lines
    /// as `file_count`.
    pub fn with_search_results(mut self, raw: &str) -> Self {
        let mut lines: Vec<&str> = raw.lines().filter(|l| !l.is_empty()).collect();
        let mut truncated = false;
        if let Some(last) = lines.last() {
            if last.starts_with("...") {
                truncated = true;
                lines.pop();
            }
        }
        if let Self::CodeSearch { file_count, truncated: t, .. } = &mut self {
            *file_count = lines.len() as u32;
            *t = truncated;
        }
        self
    }

    pub fn http_request(url: impl Into<String>, method: Option<String>) -> Self {
        Self::HttpRequest { url: url.into(), method }
    }

    pub fn create_task(title: impl Into<String>, description: Option<String>) -> Self {
        Self::CreateTask { title: title.into(), description }
    }

    pub fn subagent_task(prompt: impl Into<String>, subagent_type: Option<String>) -> Self {
        Self::SubagentTask { prompt: prompt.into(), subagent_type }
    }

    pub fn show_plan(entries: Vec<String>) -> Self {
        Self::ShowPlan { entries }
    }

    pub fn manage_todos(items: Vec<String>) -> Self {
        Self::ManageTodos { items }
    }

    pub fn misc(label: impl Into<String>, raw: serde_json::Value) -> Self {
        Self::Misc { label: label.into(), raw }
    }

    /// Fallback for any tool name this crate has no dedicated mapping for.
    pub fn generic(tool_name: impl Into<String>, raw_input: serde_json::Value) -> Self {
        Self::Generic { tool_name: tool_name.into(), raw_input }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
