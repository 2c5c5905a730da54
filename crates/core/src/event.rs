// SPDX-License-Identifier: MIT

//! Canonical event stream emitted by every transport adapter.

use crate::ids::{OperationId, SessionId};
use crate::payload::NormalizedPayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Pending,
    Running,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatusKind {
    New,
    Resumed,
}

/// One entry in a `permission_request` event's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOption {
    pub id: String,
    pub label: String,
}

/// Canonical, dialect-independent event emitted by a transport adapter.
/// Serialized as a tagged union keyed on `type`; unused variant fields are
/// omitted rather than emitted as `null`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    MessageChunk {
        session_id: SessionId,
        operation_id: OperationId,
        text: String,
    },
    Reasoning {
        session_id: SessionId,
        operation_id: OperationId,
        reasoning_text: String,
    },
    ToolCall {
        session_id: SessionId,
        operation_id: OperationId,
        tool_call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_tool_call_id: Option<String>,
        tool_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_title: Option<String>,
        tool_status: ToolStatus,
        normalized_payload: NormalizedPayload,
    },
    ToolUpdate {
        session_id: SessionId,
        operation_id: OperationId,
        tool_call_id: String,
        tool_status: ToolStatus,
        normalized_payload: NormalizedPayload,
    },
    Plan {
        session_id: SessionId,
        operation_id: OperationId,
        plan_entries: Vec<String>,
    },
    Complete {
        session_id: SessionId,
        operation_id: OperationId,
    },
    Error {
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation_id: Option<OperationId>,
        message: String,
    },
    PermissionRequest {
        session_id: SessionId,
        operation_id: OperationId,
        pending_id: String,
        permission_title: String,
        permission_options: Vec<PermissionOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_details: Option<serde_json::Value>,
    },
    PermissionCancelled {
        session_id: SessionId,
        pending_id: String,
    },
    SessionStatus {
        session_id: SessionId,
        status: SessionStatusKind,
    },
    ContextWindow {
        session_id: SessionId,
        context_window_size: u32,
        context_window_used: u32,
    },
    AvailableCommands {
        session_id: SessionId,
        commands: Vec<String>,
    },
}

impl AgentEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::MessageChunk { session_id, .. }
            | Self::Reasoning { session_id, .. }
            | Self::ToolCall { session_id, .. }
            | Self::ToolUpdate { session_id, .. }
            | Self::Plan { session_id, .. }
            | Self::Complete { session_id, .. }
            | Self::Error { session_id, .. }
            | Self::PermissionRequest { session_id, .. }
            | Self::PermissionCancelled { session_id, .. }
            | Self::SessionStatus { session_id, .. }
            | Self::ContextWindow { session_id, .. }
            | Self::AvailableCommands { session_id, .. } => session_id,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
