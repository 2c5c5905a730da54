// SPDX-License-Identifier: MIT

//! The per-protocol adapter contract every transport dialect implements.

use crate::error::AdapterError;
use async_trait::async_trait;
use conductor_core::{AgentEvent, PermissionOption, SessionId};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Minimum bounded channel capacity for an adapter's event stream (§5).
pub const MIN_EVENT_CHANNEL_CAPACITY: usize = 100;

/// A mid-turn permission prompt surfaced by the subprocess. Returned by
/// `PermissionHandler::ask` so the adapter can reply over its own wire
/// format (ACP request, stream-json control_response, OpenCode POST).
#[derive(Debug, Clone)]
pub struct PermissionAsk {
    pub session_id: SessionId,
    pub pending_id: String,
    pub title: String,
    pub options: Vec<PermissionOption>,
}

/// Registered by the orchestrator so an adapter can brokers a mid-turn
/// permission request back up to whatever is driving the session.
#[async_trait]
pub trait PermissionHandler: Send + Sync {
    async fn ask(&self, request: PermissionAsk) -> PermissionReply;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionReply {
    Approve { option_id: String },
    Reject,
    Cancelled,
}

/// Everything a `prompt` call needs beyond the message text.
#[derive(Debug, Clone, Default)]
pub struct PromptAttachments {
    pub file_paths: Vec<String>,
}

/// The per-protocol adapter contract (§4.D). An adapter owns exactly one
/// subprocess (or, for OpenCode, one spawned HTTP server) for its lifetime.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Extra environment variables the subprocess needs beyond `RuntimeConfig`
    /// (e.g. generated auth tokens, permission policy documents).
    async fn prepare_environment(&self) -> Result<HashMap<String, String>, AdapterError>;

    /// Extra argv fragments the subprocess needs beyond the command builder's
    /// output (e.g. a control-protocol flag).
    fn prepare_command_args(&self) -> Vec<String>;

    /// Wire up the subprocess's stdio (or, for OpenCode, begin scraping its
    /// startup log for the listen URL).
    async fn connect(&mut self, stdin: tokio::process::ChildStdin, stdout: tokio::process::ChildStdout) -> Result<(), AdapterError>;

    /// Perform the protocol handshake.
    async fn initialize(&mut self) -> Result<(), AdapterError>;

    async fn new_session(&mut self, mcp_servers: &[String]) -> Result<SessionId, AdapterError>;

    /// Resume or fork an existing session.
    async fn load_session(&mut self, session_id: &SessionId) -> Result<(), AdapterError>;

    /// Send a prompt and block until the turn reaches idle.
    async fn prompt(&mut self, message: &str, attachments: &PromptAttachments) -> Result<(), AdapterError>;

    async fn cancel(&mut self) -> Result<(), AdapterError>;

    /// Take the receiving half of this adapter's bounded event channel.
    /// Callable once; subsequent calls return `None`.
    fn take_updates(&mut self) -> Option<mpsc::Receiver<AgentEvent>>;

    fn set_permission_handler(&mut self, handler: std::sync::Arc<dyn PermissionHandler>);

    /// True when the subprocess will not exit on stdin close (e.g. a
    /// locally-spawned HTTP server) and must instead be killed.
    fn requires_process_kill(&self) -> bool;

    async fn close(&mut self) -> Result<(), AdapterError>;
}
