// SPDX-License-Identifier: MIT

//! stream-json dialect (Claude Code / Amp): newline-delimited JSON with a
//! tagged discriminator. This module is the pure parse/dispatch half; the
//! stdio I/O loop lives in `StreamJsonAdapter`.

use crate::correlator::Correlator;
use crate::error::AdapterError;
use crate::normalize::{normalize_tool_status, NormalizerState};
use crate::tool_call::normalize_tool_input;
use crate::transport::{PermissionAsk, PermissionHandler, PermissionReply, PromptAttachments, TransportAdapter, MIN_EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use conductor_core::{AgentEvent, OperationId, PermissionOption, SessionId, ToolStatus};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::sync::{mpsc, oneshot};

/// One line of stream-json input, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StreamJsonLine {
    #[serde(rename = "system")]
    System { subtype: Option<String>, #[serde(default)] session_id: Option<String> },
    #[serde(rename = "assistant")]
    Assistant { message: AssistantMessage },
    #[serde(rename = "user")]
    User { message: Value },
    #[serde(rename = "result")]
    Result { subtype: Option<String> },
    #[serde(rename = "control_request")]
    ControlRequest { request_id: String, subtype: String, #[serde(default)] request: Value },
    #[serde(rename = "control_response")]
    ControlResponse { request_id: String, #[serde(default)] response: Value },
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: ContentField,
}

/// Content may arrive as a bare string or as an array of typed blocks;
/// parsing must tolerate both.
#[derive(Debug, Default)]
pub enum ContentField {
    #[default]
    Empty,
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl<'de> Deserialize<'de> for ContentField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => Ok(ContentField::Text(s)),
            Value::Array(items) => {
                let blocks = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value::<ContentBlock>(item).ok())
                    .collect();
                Ok(ContentField::Blocks(blocks))
            }
            Value::Null => Ok(ContentField::Empty),
            _ => Ok(ContentField::Empty),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "thinking")]
    Thinking { thinking: String },
    #[serde(rename = "tool_use")]
    ToolUse { id: String, name: String, #[serde(default)] input: Value },
    #[serde(rename = "tool_result")]
    ToolResult { tool_use_id: String, #[serde(default)] content: Value, #[serde(default)] is_error: bool },
}

/// Parse one raw line and translate it into zero or more canonical events.
/// Malformed lines are logged by the caller and produce no events rather
/// than aborting the stream (§7 propagation policy).
pub fn translate_line(
    raw: &str,
    session_id: &SessionId,
    operation_id: &OperationId,
    state: &mut NormalizerState,
) -> Vec<AgentEvent> {
    let Ok(line) = serde_json::from_str::<StreamJsonLine>(raw) else {
        tracing::debug!(raw, "dropping unrecognized stream-json line");
        return Vec::new();
    };
    match line {
        StreamJsonLine::User { .. } => Vec::new(),
        StreamJsonLine::System { session_id: _, subtype: _ } => Vec::new(),
        StreamJsonLine::ControlRequest { .. } => Vec::new(),
        StreamJsonLine::ControlResponse { .. } => Vec::new(),
        StreamJsonLine::Result { .. } => {
            vec![AgentEvent::Complete { session_id: session_id.clone(), operation_id: operation_id.clone() }]
        }
        StreamJsonLine::Assistant { message } => translate_assistant_message(message, session_id, operation_id, state),
    }
}

fn translate_assistant_message(
    message: AssistantMessage,
    session_id: &SessionId,
    operation_id: &OperationId,
    state: &mut NormalizerState,
) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    match message.content {
        ContentField::Text(text) => {
            if let Some(suffix) = state.advance_text("message", Some(&text), None) {
                events.push(AgentEvent::MessageChunk {
                    session_id: session_id.clone(),
                    operation_id: operation_id.clone(),
                    text: suffix,
                });
            }
        }
        ContentField::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => {
                        if let Some(suffix) = state.advance_text("message", Some(&text), None) {
                            events.push(AgentEvent::MessageChunk {
                                session_id: session_id.clone(),
                                operation_id: operation_id.clone(),
                                text: suffix,
                            });
                        }
                    }
                    ContentBlock::Thinking { thinking } => {
                        if let Some(suffix) = state.advance_text("reasoning", Some(&thinking), None) {
                            events.push(AgentEvent::Reasoning {
                                session_id: session_id.clone(),
                                operation_id: operation_id.clone(),
                                reasoning_text: suffix,
                            });
                        }
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        let payload = normalize_tool_input(&name, &input);
                        let first_seen = state.observe_tool_call(&id);
                        let status = ToolStatus::Running;
                        events.push(if first_seen {
                            AgentEvent::ToolCall {
                                session_id: session_id.clone(),
                                operation_id: operation_id.clone(),
                                tool_call_id: id,
                                parent_tool_call_id: None,
                                tool_name: name,
                                tool_title: None,
                                tool_status: status,
                                normalized_payload: payload,
                            }
                        } else {
                            AgentEvent::ToolUpdate {
                                session_id: session_id.clone(),
                                operation_id: operation_id.clone(),
                                tool_call_id: id,
                                tool_status: status,
                                normalized_payload: payload,
                            }
                        });
                    }
                    ContentBlock::ToolResult { tool_use_id, is_error, .. } => {
                        state.observe_tool_call(&tool_use_id);
                        events.push(AgentEvent::ToolUpdate {
                            session_id: session_id.clone(),
                            operation_id: operation_id.clone(),
                            tool_call_id: tool_use_id,
                            tool_status: if is_error { ToolStatus::Error } else { normalize_tool_status("completed") },
                            normalized_payload: conductor_core::NormalizedPayload::generic("tool_result", Value::Null),
                        });
                    }
                }
            }
        }
        ContentField::Empty => {}
    }
    events
}

const INITIALIZE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
const PROMPT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60 * 30);

struct SessionContext {
    session_id: SessionId,
    operation_id: OperationId,
}

/// Drives a stream-json subprocess: writes one user-message line per prompt,
/// reads output lines in the background, and resolves the pending prompt
/// wait when a terminal `result` line arrives.
pub struct StreamJsonAdapter {
    writer: Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    next_request_id: AtomicI64,
    control_correlator: Arc<Correlator<Value>>,
    turn_waiter: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    events_tx: mpsc::Sender<AgentEvent>,
    events_rx: Option<mpsc::Receiver<AgentEvent>>,
    permission_handler: Arc<Mutex<Option<Arc<dyn PermissionHandler>>>>,
    normalizer: Arc<Mutex<NormalizerState>>,
    context: Arc<Mutex<Option<SessionContext>>>,
}

impl Default for StreamJsonAdapter {
    fn default() -> Self {
        Self::with_capacity(MIN_EVENT_CHANNEL_CAPACITY)
    }
}

impl StreamJsonAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (events_tx, events_rx) = mpsc::channel(capacity.max(MIN_EVENT_CHANNEL_CAPACITY));
        Self {
            writer: None,
            next_request_id: AtomicI64::new(1),
            control_correlator: Arc::new(Correlator::new()),
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
impl TransportAdapter for StreamJsonAdapter {
    async fn prepare_environment(&self) -> Result<HashMap<String, String>, AdapterError> {
        Ok(HashMap::new())
    }

    fn prepare_command_args(&self) -> Vec<String> {
        vec!["--input-format".to_string(), "stream-json".to_string(), "--output-format".to_string(), "stream-json".to_string(), "--verbose".to_string()]
    }

    async fn connect(&mut self, stdin: ChildStdin, stdout: ChildStdout) -> Result<(), AdapterError> {
        self.writer = Some(Arc::new(tokio::sync::Mutex::new(BufWriter::new(stdin))));

        let control_correlator = self.control_correlator.clone();
        let turn_waiter = self.turn_waiter.clone();
        let events_tx = self.events_tx.clone();
        let normalizer = self.normalizer.clone();
        let context = self.context.clone();
        let writer = self.writer.clone();
        let permission_handler = self.permission_handler.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                handle_line(&line, &control_correlator, &turn_waiter, &events_tx, &normalizer, &context, &writer, &permission_handler).await;
            }
        });
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(), AdapterError> {
        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst).to_string();
        let rx = self.control_correlator.wait_for(id.clone());
        self.write_line(&json!({"type": "control_request", "request_id": id, "subtype": "initialize", "request": {}})).await?;
        tokio::time::timeout(INITIALIZE_TIMEOUT, rx).await.map_err(|_| AdapterError::Timeout(INITIALIZE_TIMEOUT))?.map_err(|_| AdapterError::Protocol("initialize correlator dropped".into()))?;
        Ok(())
    }

    async fn new_session(&mut self, _mcp_servers: &[String]) -> Result<SessionId, AdapterError> {
        let session_id = SessionId::new();
        let operation_id = OperationId::new();
        *self.context.lock() = Some(SessionContext { session_id, operation_id });
        Ok(session_id)
    }

    async fn load_session(&mut self, session_id: &SessionId) -> Result<(), AdapterError> {
        *self.context.lock() = Some(SessionContext { session_id: *session_id, operation_id: OperationId::new() });
        Ok(())
    }

    async fn prompt(&mut self, message: &str, _attachments: &PromptAttachments) -> Result<(), AdapterError> {
        let (tx, rx) = oneshot::channel();
        *self.turn_waiter.lock() = Some(tx);
        self.write_line(&json!({"type": "user", "message": {"role": "user", "content": message}})).await?;
        tokio::time::timeout(PROMPT_TIMEOUT, rx).await.map_err(|_| AdapterError::Timeout(PROMPT_TIMEOUT))?.map_err(|_| AdapterError::Protocol("turn waiter dropped".into()))?;
        Ok(())
    }

    async fn cancel(&mut self) -> Result<(), AdapterError> {
        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.write_line(&json!({"type": "control_request", "request_id": id, "subtype": "interrupt", "request": {}})).await
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
        self.control_correlator.clear();
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_line(
    line: &str,
    control_correlator: &Correlator<Value>,
    turn_waiter: &Mutex<Option<oneshot::Sender<()>>>,
    events_tx: &mpsc::Sender<AgentEvent>,
    normalizer: &Mutex<NormalizerState>,
    context: &Mutex<Option<SessionContext>>,
    writer: &Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    permission_handler: &Mutex<Option<Arc<dyn PermissionHandler>>>,
) {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        tracing::warn!(line, "dropping malformed stream-json control line");
        return;
    };
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();

    if kind == "control_response" {
        if let Some(request_id) = value.get("request_id").and_then(Value::as_str) {
            control_correlator.resolve(request_id, value.get("response").cloned().unwrap_or(Value::Null));
        }
        return;
    }

    if kind == "control_request" {
        if value.get("subtype").and_then(Value::as_str) == Some("can_use_tool") {
            handle_can_use_tool(&value, events_tx, context, writer, permission_handler).await;
        }
        return;
    }

    let (session_id, operation_id) = match context.lock().as_ref() {
        Some(ctx) => (ctx.session_id, ctx.operation_id),
        None => return,
    };
    let mut events = translate_line(line, &session_id, &operation_id, &mut normalizer.lock());
    let is_result = kind == "result";
    for event in events.drain(..) {
        let _ = events_tx.try_send(event);
    }
    if is_result {
        if let Some(tx) = turn_waiter.lock().take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_can_use_tool(
    value: &Value,
    events_tx: &mpsc::Sender<AgentEvent>,
    context: &Mutex<Option<SessionContext>>,
    writer: &Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    permission_handler: &Mutex<Option<Arc<dyn PermissionHandler>>>,
) {
    let Some(request_id) = value.get("request_id").and_then(Value::as_str).map(String::from) else { return };
    let (session_id, operation_id) = match context.lock().as_ref() {
        Some(ctx) => (ctx.session_id, ctx.operation_id),
        None => return,
    };
    let request = value.get("request").cloned().unwrap_or(Value::Null);
    let tool_name = request.get("tool_name").and_then(Value::as_str).unwrap_or("tool").to_string();
    let options = vec![
        PermissionOption { id: "allow".to_string(), label: "Allow".to_string() },
        PermissionOption { id: "deny".to_string(), label: "Deny".to_string() },
    ];

    let ask = PermissionAsk { session_id, pending_id: request_id.clone(), title: tool_name.clone(), options: options.clone() };
    let _ = events_tx.try_send(AgentEvent::PermissionRequest {
        session_id,
        operation_id,
        pending_id: request_id.clone(),
        permission_title: tool_name,
        permission_options: options,
        action_type: None,
        action_details: None,
    });

    let handler = permission_handler.lock().clone();
    let reply = match handler {
        Some(handler) => handler.ask(ask).await,
        None => PermissionReply::Cancelled,
    };

    let response = match &reply {
        PermissionReply::Approve { .. } => json!({"behavior": "allow", "updatedInput": request.get("input").cloned().unwrap_or(Value::Null)}),
        PermissionReply::Reject | PermissionReply::Cancelled => json!({"behavior": "deny", "message": "denied"}),
    };
    if let Some(writer) = writer {
        let outgoing = json!({"type": "control_response", "response": {"request_id": request_id, "subtype": "success", "response": response}});
        if let Ok(mut bytes) = serde_json::to_vec(&outgoing) {
            bytes.push(b'\n');
            let mut guard = writer.lock().await;
            let _ = guard.write_all(&bytes).await;
            let _ = guard.flush().await;
        }
    }
    if matches!(reply, PermissionReply::Cancelled) {
        let _ = events_tx.try_send(AgentEvent::PermissionCancelled { session_id, pending_id: request_id });
    }
}

#[cfg(test)]
#[path = "stream_json_tests.rs"]
mod tests;
