// SPDX-License-Identifier: MIT

//! Codex's application-server dialect: line-delimited JSON like stream-json,
//! but tagged `item.*`/`turn.*` rather than `assistant`/`result`, and with
//! native session resume via `thread/resume` instead of full-context replay.

use crate::error::AdapterError;
use crate::normalize::{normalize_tool_status, NormalizerState};
use crate::tool_call::normalize_tool_input;
use crate::transport::{PermissionHandler, PromptAttachments, TransportAdapter, MIN_EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use conductor_core::{AgentEvent, OperationId, SessionId, ToolStatus};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum CodexLine {
    #[serde(rename = "thread.started")]
    ThreadStarted { thread_id: String },
    #[serde(rename = "item.started")]
    ItemStarted { item: CodexItem },
    #[serde(rename = "item.updated")]
    ItemUpdated { item: CodexItem },
    #[serde(rename = "item.completed")]
    ItemCompleted { item: CodexItem },
    #[serde(rename = "turn.completed")]
    TurnCompleted {},
    #[serde(rename = "turn.failed")]
    TurnFailed { #[serde(default)] error: Option<String> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum CodexItem {
    AgentMessage { id: String, text: String },
    Reasoning { id: String, text: String },
    CommandExecution { id: String, #[serde(default)] command: String, #[serde(default)] cwd: Option<String>, #[serde(default)] status: Option<String> },
    McpToolCall { id: String, server: String, tool: String, #[serde(default)] arguments: Value, #[serde(default)] status: Option<String> },
    TodoList { #[serde(default)] items: Vec<String> },
}

/// Native session resume uses Codex's own `thread/resume` request rather
/// than replaying the conversation through a new process, so the orchestrator
/// never has to reconstruct prior turns for this dialect.
pub fn thread_resume_request(thread_id: &str) -> Value {
    serde_json::json!({"type": "thread.resume", "thread_id": thread_id})
}

pub fn translate_line(raw: &str, session_id: &SessionId, operation_id: &OperationId, state: &mut NormalizerState) -> Vec<AgentEvent> {
    let Ok(line) = serde_json::from_str::<CodexLine>(raw) else {
        tracing::debug!(raw, "dropping unrecognized codex line");
        return Vec::new();
    };
    match line {
        CodexLine::ThreadStarted { .. } => Vec::new(),
        CodexLine::TurnCompleted {} => vec![AgentEvent::Complete { session_id: *session_id, operation_id: *operation_id }],
        CodexLine::TurnFailed { error } => vec![AgentEvent::Error { session_id: *session_id, operation_id: Some(*operation_id), message: error.unwrap_or_else(|| "turn failed".to_string()) }],
        CodexLine::ItemStarted { item } => translate_item(item, session_id, operation_id, state, true),
        CodexLine::ItemUpdated { item } | CodexLine::ItemCompleted { item } => translate_item(item, session_id, operation_id, state, false),
    }
}

fn translate_item(item: CodexItem, session_id: &SessionId, operation_id: &OperationId, state: &mut NormalizerState, is_start: bool) -> Vec<AgentEvent> {
    match item {
        CodexItem::AgentMessage { id, text } => state
            .advance_text(&id, Some(&text), None)
            .map(|suffix| vec![AgentEvent::MessageChunk { session_id: *session_id, operation_id: *operation_id, text: suffix }])
            .unwrap_or_default(),
        CodexItem::Reasoning { id, text } => state
            .advance_text(&format!("reasoning:{id}"), Some(&text), None)
            .map(|suffix| vec![AgentEvent::Reasoning { session_id: *session_id, operation_id: *operation_id, reasoning_text: suffix }])
            .unwrap_or_default(),
        CodexItem::CommandExecution { id, command, cwd, status } => {
            let payload = normalize_tool_input("bash", &serde_json::json!({"command": command, "cwd": cwd}));
            emit_tool_event(id, "command_execution".to_string(), payload, status, state, session_id, operation_id, is_start)
        }
        CodexItem::McpToolCall { id, server, tool, arguments, status } => {
            let payload = normalize_tool_input(&tool, &arguments);
            emit_tool_event(id, format!("{server}.{tool}"), payload, status, state, session_id, operation_id, is_start)
        }
        CodexItem::TodoList { items } => vec![AgentEvent::ToolUpdate {
            session_id: *session_id,
            operation_id: *operation_id,
            tool_call_id: "todo".to_string(),
            tool_status: ToolStatus::Complete,
            normalized_payload: conductor_core::NormalizedPayload::manage_todos(items),
        }],
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_tool_event(
    tool_call_id: String,
    tool_name: String,
    payload: conductor_core::NormalizedPayload,
    status: Option<String>,
    state: &mut NormalizerState,
    session_id: &SessionId,
    operation_id: &OperationId,
    is_start: bool,
) -> Vec<AgentEvent> {
    let tool_status = status.as_deref().map(normalize_tool_status).unwrap_or(ToolStatus::Running);
    let first_seen = state.observe_tool_call(&tool_call_id);
    if is_start && first_seen {
        vec![AgentEvent::ToolCall { session_id: *session_id, operation_id: *operation_id, tool_call_id, parent_tool_call_id: None, tool_name, tool_title: None, tool_status, normalized_payload: payload }]
    } else {
        vec![AgentEvent::ToolUpdate { session_id: *session_id, operation_id: *operation_id, tool_call_id, tool_status, normalized_payload: payload }]
    }
}

const PROMPT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60 * 30);

struct SessionContext {
    session_id: SessionId,
    operation_id: OperationId,
}

/// Drives a Codex application-server subprocess: writes one turn-input line
/// per prompt, reads output lines in the background, and resolves the
/// pending prompt wait when `turn.completed`/`turn.failed` arrives.
pub struct CodexAdapter {
    writer: Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    turn_waiter: Arc<Mutex<Option<oneshot::Sender<Result<(), String>>>>>,
    events_tx: mpsc::Sender<AgentEvent>,
    events_rx: Option<mpsc::Receiver<AgentEvent>>,
    permission_handler: Arc<Mutex<Option<Arc<dyn PermissionHandler>>>>,
    normalizer: Arc<Mutex<NormalizerState>>,
    context: Arc<Mutex<Option<SessionContext>>>,
}

impl Default for CodexAdapter {
    fn default() -> Self {
        Self::with_capacity(MIN_EVENT_CHANNEL_CAPACITY)
    }
}

impl CodexAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (events_tx, events_rx) = mpsc::channel(capacity.max(MIN_EVENT_CHANNEL_CAPACITY));
        Self {
            writer: None,
            turn_waiter: Arc::new(Mutex::new(None)),
            events_tx,
            events_rx: Some(events_rx),
            permission_handler: Arc::new(Mutex::new(None)),
            normalizer: Arc::new(Mutex::new(NormalizerState::new())),
            context: Arc::new(Mutex::new(None)),
        }
    }

    async fn write_line(&self, value: &Value) -> Result<(), AdapterError> {
        let writer = self.writer.as_ref().ok_or_else(|| AdapterError::Session("not connected".into()))?;
        let mut line = serde_json::to_vec(value).map_err(|e| AdapterError::Protocol(e.to_string()))?;
        line.push(b'\n');
        let mut guard = writer.lock().await;
        guard.write_all(&line).await?;
        guard.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for CodexAdapter {
    async fn prepare_environment(&self) -> Result<HashMap<String, String>, AdapterError> {
        Ok(HashMap::new())
    }

    fn prepare_command_args(&self) -> Vec<String> {
        vec!["app-server".to_string()]
    }

    async fn connect(&mut self, stdin: ChildStdin, stdout: ChildStdout) -> Result<(), AdapterError> {
        self.writer = Some(Arc::new(tokio::sync::Mutex::new(BufWriter::new(stdin))));

        let turn_waiter = self.turn_waiter.clone();
        let events_tx = self.events_tx.clone();
        let normalizer = self.normalizer.clone();
        let context = self.context.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                handle_line(&line, &turn_waiter, &events_tx, &normalizer, &context).await;
            }
        });
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn new_session(&mut self, _mcp_servers: &[String]) -> Result<SessionId, AdapterError> {
        let session_id = SessionId::new();
        let operation_id = OperationId::new();
        *self.context.lock() = Some(SessionContext { session_id, operation_id });
        Ok(session_id)
    }

    async fn load_session(&mut self, session_id: &SessionId) -> Result<(), AdapterError> {
        self.write_line(&thread_resume_request(session_id.as_str())).await?;
        *self.context.lock() = Some(SessionContext { session_id: *session_id, operation_id: OperationId::new() });
        Ok(())
    }

    async fn prompt(&mut self, message: &str, _attachments: &PromptAttachments) -> Result<(), AdapterError> {
        let (tx, rx) = oneshot::channel();
        *self.turn_waiter.lock() = Some(tx);
        self.write_line(&json!({"type": "turn.input", "text": message})).await?;
        match tokio::time::timeout(PROMPT_TIMEOUT, rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(message))) => Err(AdapterError::Session(message)),
            Ok(Err(_)) => Err(AdapterError::Protocol("turn waiter dropped".into())),
            Err(_) => Err(AdapterError::Timeout(PROMPT_TIMEOUT)),
        }
    }

    async fn cancel(&mut self) -> Result<(), AdapterError> {
        self.write_line(&json!({"type": "turn.interrupt"})).await
    }

    fn take_updates(&mut self) -> Option<mpsc::Receiver<AgentEvent>> {
        self.events_rx.take()
    }

    fn set_permission_handler(&mut self, handler: Arc<dyn PermissionHandler>) {
        *self.permission_handler.lock() = Some(handler);
    }

    fn requires_process_kill(&self) -> bool {
        false
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }
}

async fn handle_line(
    line: &str,
    turn_waiter: &Mutex<Option<oneshot::Sender<Result<(), String>>>>,
    events_tx: &mpsc::Sender<AgentEvent>,
    normalizer: &Mutex<NormalizerState>,
    context: &Mutex<Option<SessionContext>>,
) {
    let (session_id, operation_id) = match context.lock().as_ref() {
        Some(ctx) => (ctx.session_id, ctx.operation_id),
        None => return,
    };
    let mut events = translate_line(line, &session_id, &operation_id, &mut normalizer.lock());
    let terminal = events.iter().find_map(|event| match event {
        AgentEvent::Complete { .. } => Some(Ok(())),
        AgentEvent::Error { message, .. } => Some(Err(message.clone())),
        _ => None,
    });
    for event in events.drain(..) {
        let _ = events_tx.try_send(event);
    }
    if let Some(outcome) = terminal {
        if let Some(tx) = turn_waiter.lock().take() {
            let _ = tx.send(outcome);
        }
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
