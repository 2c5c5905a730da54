// SPDX-License-Identifier: MIT

//! Session configuration and lifecycle state.

use crate::ids::{AgentTypeId, OperationId, SessionId, TaskId, WorktreeId};
use serde::{Deserialize, Serialize};

/// Per-agent-type resume behavior, contributed by a `RuntimeConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// True when the agent binary itself supports `--resume <id>` style
    /// continuation; false means the orchestrator must replay context.
    pub native_session_resume: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_resume_flag: Option<String>,
    /// Tri-state: `None` defaults to `true` (recovery supported).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_recover: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_mount_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_session_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_session_cmd: Option<String>,
}

impl SessionConfig {
    /// Whether restart-recovery should attempt to reattach this session
    /// rather than starting fresh. Unset defaults to `true`.
    pub fn supports_recovery(&self) -> bool {
        self.can_recover.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Starting,
    Running,
    WaitingForInput,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    /// A session is idle (able to dispatch a queued message or accept a new
    /// prompt) in `WaitingForInput`; every other state rejects dispatch.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::WaitingForInput)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Live orchestrator-tracked session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub agent_id: AgentTypeId,
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<OperationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_id: Option<WorktreeId>,
    #[serde(default)]
    pub recovered: bool,
    pub last_touched_ms: u64,
}

impl Session {
    pub fn new(session_id: SessionId, task_id: TaskId, agent_id: AgentTypeId, last_touched_ms: u64) -> Self {
        Self {
            session_id,
            task_id,
            agent_id,
            state: SessionState::Starting,
            operation_id: None,
            worktree_id: None,
            recovered: false,
            last_touched_ms,
        }
    }

    /// At most one operation is in flight per session: starting a new
    /// operation while one is already set is a caller bug, not a runtime
    /// state this type needs to represent — callers must check first.
    pub fn has_operation_in_flight(&self) -> bool {
        self.operation_id.is_some() && !self.state.is_idle() && !self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
