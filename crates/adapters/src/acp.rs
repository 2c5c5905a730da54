// SPDX-License-Identifier: MIT

//! Agent Client Protocol adapter: JSON-RPC 2.0 over stdio. The agent is
//! both a server (responds to our `initialize`/`session/new`/`session/prompt`
//! calls) and a client (sends `session/update` notifications and
//! `session/request_permission` calls back at us), so both directions share
//! one `Correlator` keyed by JSON-RPC id.

use crate::correlator::Correlator;
use crate::error::AdapterError;
use crate::normalize::{normalize_tool_status, NormalizerState};
use crate::tool_call::normalize_tool_input;
use crate::transport::{PermissionAsk, PermissionHandler, PermissionReply, PromptAttachments, TransportAdapter, MIN_EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use conductor_core::{AgentEvent, OperationId, PermissionOption, SessionId, ToolStatus};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::sync::mpsc;

const INITIALIZE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
const PROMPT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60 * 30);

struct SessionContext {
    session_id: SessionId,
    operation_id: OperationId,
}

pub struct AcpAdapter {
    writer: Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    next_id: AtomicI64,
    correlator: Arc<Correlator<Value>>,
    events_tx: mpsc::Sender<AgentEvent>,
    events_rx: Option<mpsc::Receiver<AgentEvent>>,
    permission_handler: Arc<Mutex<Option<Arc<dyn PermissionHandler>>>>,
    normalizer: Arc<Mutex<NormalizerState>>,
    context: Arc<Mutex<Option<SessionContext>>>,
}

impl Default for AcpAdapter {
    fn default() -> Self {
        Self::with_capacity(MIN_EVENT_CHANNEL_CAPACITY)
    }
}

impl AcpAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity` is floored at [`MIN_EVENT_CHANNEL_CAPACITY`] regardless of
    /// what a caller-supplied config requests.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events_tx, events_rx) = mpsc::channel(capacity.max(MIN_EVENT_CHANNEL_CAPACITY));
        Self {
            writer: None,
            next_id: AtomicI64::new(1),
            correlator: Arc::new(Correlator::new()),
            events_tx,
            events_rx: Some(events_rx),
            permission_handler: Arc::new(Mutex::new(None)),
            normalizer: Arc::new(Mutex::new(NormalizerState::new())),
            context: Arc::new(Mutex::new(None)),
        }
    }

    async fn call(&self, method: &str, params: Value, timeout: std::time::Duration) -> Result<Value, AdapterError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rx = self.correlator.wait_for(id.to_string());
        self.write_message(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})).await?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response_result(response),
            Ok(Err(_)) => Err(AdapterError::Protocol(format!("{method} correlator dropped"))),
            Err(_) => Err(AdapterError::Timeout(timeout)),
        }
    }

    async fn write_message(&self, value: &Value) -> Result<(), AdapterError> {
        let writer = self.writer.as_ref().ok_or_else(|| AdapterError::Session("not connected".into()))?;
        let mut line = serde_json::to_vec(value).map_err(|e| AdapterError::Protocol(e.to_string()))?;
        line.push(b'\n');
        let mut guard = writer.lock().await;
        guard.write_all(&line).await?;
        guard.flush().await?;
        Ok(())
    }
}

fn response_result(response: Value) -> Result<Value, AdapterError> {
    if let Some(error) = response.get("error") {
        return Err(AdapterError::Protocol(error.to_string()));
    }
    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

#[async_trait]
impl TransportAdapter for AcpAdapter {
    async fn prepare_environment(&self) -> Result<HashMap<String, String>, AdapterError> {
        Ok(HashMap::new())
    }

    fn prepare_command_args(&self) -> Vec<String> {
        vec!["--acp".to_string()]
    }

    async fn connect(&mut self, stdin: ChildStdin, stdout: ChildStdout) -> Result<(), AdapterError> {
        self.writer = Some(Arc::new(tokio::sync::Mutex::new(BufWriter::new(stdin))));

        let correlator = self.correlator.clone();
        let events_tx = self.events_tx.clone();
        let normalizer = self.normalizer.clone();
        let context = self.context.clone();
        let writer = self.writer.clone();
        let permission_handler = self.permission_handler.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                handle_line(&line, &correlator, &events_tx, &normalizer, &context, &writer, &permission_handler).await;
            }
        });
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(), AdapterError> {
        self.call("initialize", json!({"protocolVersion": 1}), INITIALIZE_TIMEOUT).await?;
        Ok(())
    }

    async fn new_session(&mut self, mcp_servers: &[String]) -> Result<SessionId, AdapterError> {
        let result = self.call("session/new", json!({"mcpServers": mcp_servers}), INITIALIZE_TIMEOUT).await?;
        let raw_id = result.get("sessionId").and_then(Value::as_str).ok_or_else(|| AdapterError::Protocol("session/new missing sessionId".into()))?;
        let session_id = SessionId::from_string(raw_id);
        let operation_id = OperationId::new();
        *self.context.lock() = Some(SessionContext { session_id, operation_id });
        Ok(session_id)
    }

    async fn load_session(&mut self, session_id: &SessionId) -> Result<(), AdapterError> {
        self.call("session/load", json!({"sessionId": session_id.as_str()}), INITIALIZE_TIMEOUT).await?;
        *self.context.lock() = Some(SessionContext { session_id: *session_id, operation_id: OperationId::new() });
        Ok(())
    }

    async fn prompt(&mut self, message: &str, attachments: &PromptAttachments) -> Result<(), AdapterError> {
        let session_id = self.context.lock().as_ref().map(|c| c.session_id).ok_or_else(|| AdapterError::Session("no active session".into()))?;
        let mut content = vec![json!({"type": "text", "text": message})];
        for path in &attachments.file_paths {
            content.push(json!({"type": "resource_link", "uri": format!("file://{path}")}));
        }
        self.call("session/prompt", json!({"sessionId": session_id.as_str(), "prompt": content}), PROMPT_TIMEOUT).await?;
        Ok(())
    }

    async fn cancel(&mut self) -> Result<(), AdapterError> {
        let session_id = self.context.lock().as_ref().map(|c| c.session_id);
        if let Some(session_id) = session_id {
            self.write_message(&json!({"jsonrpc": "2.0", "method": "session/cancel", "params": {"sessionId": session_id.as_str()}})).await?;
        }
        Ok(())
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
        self.correlator.clear();
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_line(
    line: &str,
    correlator: &Correlator<Value>,
    events_tx: &mpsc::Sender<AgentEvent>,
    normalizer: &Mutex<NormalizerState>,
    context: &Mutex<Option<SessionContext>>,
    writer: &Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    permission_handler: &Mutex<Option<Arc<dyn PermissionHandler>>>,
) {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        tracing::warn!(line, "dropping malformed ACP line");
        return;
    };

    if let Some(id) = value.get("id").and_then(|v| v.as_i64().map(|n| n.to_string()).or_else(|| v.as_str().map(String::from))) {
        if value.get("method").is_none() {
            correlator.resolve(&id, value);
            return;
        }
        if value.get("method").and_then(Value::as_str) == Some("session/request_permission") {
            handle_permission_request(id, &value, events_tx, context, writer, permission_handler).await;
            return;
        }
    }

    if value.get("method").and_then(Value::as_str) == Some("session/update") {
        let Some(params) = value.get("params") else { return };
        let (session_id, operation_id) = match context.lock().as_ref() {
            Some(ctx) => (ctx.session_id, ctx.operation_id),
            None => return,
        };
        let mut events = translate_update(params, session_id, operation_id, &mut normalizer.lock());
        for event in events.drain(..) {
            let _ = events_tx.try_send(event);
        }
    }
}

async fn handle_permission_request(
    id: String,
    value: &Value,
    events_tx: &mpsc::Sender<AgentEvent>,
    context: &Mutex<Option<SessionContext>>,
    writer: &Option<Arc<tokio::sync::Mutex<BufWriter<ChildStdin>>>>,
    permission_handler: &Mutex<Option<Arc<dyn PermissionHandler>>>,
) {
    let Some(params) = value.get("params") else { return };
    let session_id = match context.lock().as_ref() {
        Some(ctx) => ctx.session_id,
        None => return,
    };
    let options: Vec<PermissionOption> = params
        .get("options")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|o| {
                    Some(PermissionOption { id: o.get("optionId")?.as_str()?.to_string(), label: o.get("name")?.as_str().unwrap_or_default().to_string() })
                })
                .collect()
        })
        .unwrap_or_default();
    let title = params.get("toolCall").and_then(|t| t.get("title")).and_then(Value::as_str).unwrap_or("permission request").to_string();

    let ask = PermissionAsk { session_id, pending_id: id.clone(), title: title.clone(), options: options.clone() };
    let _ = events_tx.try_send(AgentEvent::PermissionRequest {
        session_id,
        operation_id: context.lock().as_ref().map(|c| c.operation_id).unwrap_or_default(),
        pending_id: id.clone(),
        permission_title: title,
        permission_options: options,
        action_type: None,
        action_details: None,
    });
    let handler = permission_handler.lock().clone();
    let reply = match handler {
        Some(handler) => handler.ask(ask).await,
        None => PermissionReply::Cancelled,
    };

    let outcome = match &reply {
        PermissionReply::Approve { option_id } => json!({"outcome": {"outcome": "selected", "optionId": option_id}}),
        PermissionReply::Reject | PermissionReply::Cancelled => json!({"outcome": {"outcome": "cancelled"}}),
    };
    if let Some(writer) = writer {
        let response = json!({"jsonrpc": "2.0", "id": id.parse::<i64>().unwrap_or(0), "result": outcome});
        if let Ok(mut bytes) = serde_json::to_vec(&response) {
            bytes.push(b'\n');
            let mut guard = writer.lock().await;
            let _ = guard.write_all(&bytes).await;
            let _ = guard.flush().await;
        }
    }
    if matches!(reply, PermissionReply::Cancelled) {
        let _ = events_tx.try_send(AgentEvent::PermissionCancelled { session_id, pending_id: id });
    }
}

/// Translate one `session/update` notification's params into canonical
/// events. ACP nests an `update` object tagged by `sessionUpdate`.
fn translate_update(params: &Value, session_id: SessionId, operation_id: OperationId, state: &mut NormalizerState) -> Vec<AgentEvent> {
    let Some(update) = params.get("update") else { return Vec::new() };
    let kind = update.get("sessionUpdate").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "agent_message_chunk" => {
            let text = update.get("content").and_then(|c| c.get("text")).and_then(Value::as_str).unwrap_or_default();
            state
                .advance_text("message", Some(text), None)
                .map(|suffix| vec![AgentEvent::MessageChunk { session_id, operation_id, text: suffix }])
                .unwrap_or_default()
        }
        "agent_thought_chunk" => {
            let text = update.get("content").and_then(|c| c.get("text")).and_then(Value::as_str).unwrap_or_default();
            state
                .advance_text("reasoning", Some(text), None)
                .map(|suffix| vec![AgentEvent::Reasoning { session_id, operation_id, reasoning_text: suffix }])
                .unwrap_or_default()
        }
        "tool_call" => {
            let tool_call_id = update.get("toolCallId").and_then(Value::as_str).unwrap_or_default().to_string();
            let tool_name = update.get("title").and_then(Value::as_str).unwrap_or("tool").to_string();
            let input = update.get("rawInput").cloned().unwrap_or(Value::Null);
            let payload = normalize_tool_input(&tool_name, &input);
            state.observe_tool_call(&tool_call_id);
            vec![AgentEvent::ToolCall { session_id, operation_id, tool_call_id, parent_tool_call_id: None, tool_name, tool_title: None, tool_status: ToolStatus::Pending, normalized_payload: payload }]
        }
        "tool_call_update" => {
            let tool_call_id = update.get("toolCallId").and_then(Value::as_str).unwrap_or_default().to_string();
            let status = update.get("status").and_then(Value::as_str).map(normalize_tool_status).unwrap_or(ToolStatus::Running);
            let input = update.get("rawInput").cloned().unwrap_or(Value::Null);
            let payload = normalize_tool_input("", &input);
            vec![AgentEvent::ToolUpdate { session_id, operation_id, tool_call_id, tool_status: status, normalized_payload: payload }]
        }
        "plan" => {
            let entries = update.get("entries").and_then(Value::as_array).map(|arr| arr.iter().filter_map(|e| e.get("content").and_then(Value::as_str).map(String::from)).collect()).unwrap_or_default();
            vec![AgentEvent::Plan { session_id, operation_id, plan_entries: entries }]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "acp_tests.rs"]
mod tests;
