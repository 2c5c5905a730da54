// SPDX-License-Identifier: MIT

//! Protocol-independent event normalization: incremental text emission,
//! role filtering, and tool-call first-seen/update dedup. Every transport
//! adapter owns one `NormalizerState` and drives it off its own wire
//! events; the state itself has no knowledge of any dialect.

use conductor_core::ToolStatus;
use std::collections::{HashMap, HashSet};

/// Per-part cumulative length tracking, keyed by a stable id (falling back
/// to `message_id + kind` when the dialect has no part id of its own).
#[derive(Debug, Default)]
struct TextPart {
    last_text_len: usize,
}

#[derive(Debug, Default)]
pub struct NormalizerState {
    text_parts: HashMap<String, TextPart>,
    seen_tool_calls: HashSet<String>,
}

impl NormalizerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Given a new event carrying a cumulative `text` and/or a `delta` for
    /// `part_id`, return the suffix that should be emitted as a
    /// `message_chunk`, or `None` if nothing new arrived.
    ///
    /// If `text` is non-empty and longer than the tracked length, the suffix
    /// is emitted and the tracked length advances. Otherwise, if `delta` is
    /// non-empty and nothing has been tracked yet for this part, the delta
    /// itself is emitted — this is what prevents duplicate output when a
    /// dialect sends both cumulative and delta forms for the same part.
    pub fn advance_text(&mut self, part_id: &str, text: Option<&str>, delta: Option<&str>) -> Option<String> {
        let part = self.text_parts.entry(part_id.to_string()).or_default();
        if let Some(text) = text {
            if !text.is_empty() && text.len() > part.last_text_len {
                let suffix = text[part.last_text_len..].to_string();
                part.last_text_len = text.len();
                return Some(suffix);
            }
        }
        if let Some(delta) = delta {
            if !delta.is_empty() && part.last_text_len == 0 {
                part.last_text_len = delta.len();
                return Some(delta.to_string());
            }
        }
        None
    }

    /// Role filter: messages flagged `role == "user"` echo the prompt back
    /// and must be dropped before emission.
    pub fn should_drop_role(role: Option<&str>) -> bool {
        role == Some("user")
    }

    /// First occurrence of `tool_call_id` returns `Pending`/`ToolCall`
    /// semantics (caller emits `tool_call`); subsequent occurrences mean the
    /// caller should emit `tool_update` instead.
    pub fn observe_tool_call(&mut self, tool_call_id: &str) -> bool {
        self.seen_tool_calls.insert(tool_call_id.to_string())
    }

    /// Reset all text-part and token-accounting state on `session.compacted`.
    pub fn reset_on_compaction(&mut self) {
        self.text_parts.clear();
        self.seen_tool_calls.clear();
    }
}

/// Map a dialect-specific status string to the canonical set.
pub fn normalize_tool_status(raw: &str) -> ToolStatus {
    match raw {
        "pending" => ToolStatus::Pending,
        "running" | "in_progress" => ToolStatus::Running,
        "completed" | "complete" | "success" => ToolStatus::Complete,
        _ => ToolStatus::Error,
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
