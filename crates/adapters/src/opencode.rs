// SPDX-License-Identifier: MIT

//! OpenCode adapter: REST + SSE over a locally-spawned HTTP server. The
//! subprocess prints its listen address to stdout instead of speaking a
//! framed protocol on stdio, so `connect` scrapes that line and otherwise
//! drains stdout to a sink.

use crate::error::AdapterError;
use crate::http::{self, BasicAuth};
use crate::normalize::{normalize_tool_status, NormalizerState};
use crate::tool_call::normalize_tool_input;
use crate::transport::{PermissionHandler, PromptAttachments, TransportAdapter, MIN_EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use conductor_core::{AgentEvent, OperationId, SessionId, ToolStatus};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::sync::mpsc;

const URL_SCRAPE_TIMEOUT: Duration = Duration::from_secs(180);
const PROMPT_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const ABORT_TIMEOUT: Duration = Duration::from_millis(800);
const SCRAPE_MARKER: &str = "opencode server listening on ";

pub struct OpenCodeAdapter {
    client: reqwest::Client,
    addr: Mutex<Option<String>>,
    auth: BasicAuth,
    active_session_id: Mutex<Option<String>>,
    model: String,
    agent_name: String,
    variant: Option<String>,
    events_tx: mpsc::Sender<AgentEvent>,
    events_rx: Option<mpsc::Receiver<AgentEvent>>,
    permission_handler: Mutex<Option<Arc<dyn PermissionHandler>>>,
    normalizer: Arc<Mutex<NormalizerState>>,
    operation_id: Arc<Mutex<OperationId>>,
    sse_active: Arc<AtomicBool>,
    sse_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    health_check_timeout: Duration,
}

impl OpenCodeAdapter {
    pub fn new(server_password: impl Into<String>, model: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self::with_config(server_password, model, agent_name, MIN_EVENT_CHANNEL_CAPACITY, URL_SCRAPE_TIMEOUT)
    }

    pub fn with_config(
        server_password: impl Into<String>,
        model: impl Into<String>,
        agent_name: impl Into<String>,
        event_channel_capacity: usize,
        health_check_timeout: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(event_channel_capacity.max(MIN_EVENT_CHANNEL_CAPACITY));
        Self {
            client: reqwest::Client::new(),
            addr: Mutex::new(None),
            auth: BasicAuth { username: "opencode".to_string(), password: server_password.into() },
            active_session_id: Mutex::new(None),
            model: model.into(),
            agent_name: agent_name.into(),
            variant: None,
            events_tx,
            events_rx: Some(events_rx),
            permission_handler: Mutex::new(None),
            normalizer: Arc::new(Mutex::new(NormalizerState::new())),
            operation_id: Arc::new(Mutex::new(OperationId::new())),
            sse_active: Arc::new(AtomicBool::new(false)),
            sse_task: Mutex::new(None),
            health_check_timeout,
        }
    }

    fn addr(&self) -> Result<String, AdapterError> {
        self.addr.lock().clone().ok_or_else(|| AdapterError::Session("server address not scraped yet".into()))
    }

    fn session_id(&self) -> Result<String, AdapterError> {
        self.active_session_id.lock().clone().ok_or_else(|| AdapterError::Session("no active session".into()))
    }

    /// Start the single SSE subscription, refusing a second concurrent one.
    fn subscribe_events(&self) {
        if self.sse_active.swap(true, Ordering::SeqCst) {
            return;
        }
        let addr = match self.addr.lock().clone() {
            Some(addr) => addr,
            None => {
                self.sse_active.store(false, Ordering::SeqCst);
                return;
            }
        };
        let auth = BasicAuth { username: self.auth.username.clone(), password: self.auth.password.clone() };
        let client = self.client.clone();
        let events_tx = self.events_tx.clone();
        let normalizer = self.normalizer.clone();
        let operation_id = self.operation_id.clone();
        let sse_active = self.sse_active.clone();
        let session_id = self.active_session_id.lock().clone();

        let handle = tokio::spawn(async move {
            let Ok(mut stream) = http::open_event_stream(&client, &addr, "/event", &auth).await else {
                sse_active.store(false, Ordering::SeqCst);
                return;
            };
            while let Ok(Some(data)) = stream.next_data().await {
                if let Some(session_id) = &session_id {
                    let op_id = *operation_id.lock();
                    let mut events = translate_sse_event(&data, session_id, op_id, &mut normalizer.lock());
                    for event in events.drain(..) {
                        let _ = events_tx.try_send(event);
                    }
                }
            }
            sse_active.store(false, Ordering::SeqCst);
        });
        *self.sse_task.lock() = Some(handle);
    }
}

#[async_trait]
impl TransportAdapter for OpenCodeAdapter {
    async fn prepare_environment(&self) -> Result<HashMap<String, String>, AdapterError> {
        let mut env = HashMap::new();
        env.insert("OPENCODE_SERVER_PASSWORD".to_string(), self.auth.password.clone());
        env.insert("OPENCODE_PERMISSION".to_string(), default_permission_policy());
        Ok(env)
    }

    fn prepare_command_args(&self) -> Vec<String> {
        Vec::new()
    }

    async fn connect(&mut self, _stdin: ChildStdin, stdout: ChildStdout) -> Result<(), AdapterError> {
        let mut lines = BufReader::new(stdout).lines();
        let scrape = async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(url) = line.strip_prefix(SCRAPE_MARKER) {
                    return Some(url.trim().to_string());
                }
            }
            None
        };
        let url = tokio::time::timeout(self.health_check_timeout, scrape)
            .await
            .map_err(|_| AdapterError::Timeout(self.health_check_timeout))?
            .ok_or_else(|| AdapterError::FatalStartupExit("stdout closed before server announced its listen address".into()))?;
        *self.addr.lock() = Some(url.trim_start_matches("http://").trim_start_matches("https://").to_string());

        tokio::spawn(async move {
            while lines.next_line().await.unwrap_or(None).is_some() {}
        });
        Ok(())
    }

    async fn initialize(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn new_session(&mut self, _mcp_servers: &[String]) -> Result<SessionId, AdapterError> {
        let addr = self.addr()?;
        let response = http::post(&self.client, &addr, "/session", "{}", &self.auth, PROMPT_TIMEOUT).await?;
        let parsed: Value = serde_json::from_str(&response.body).map_err(|e| AdapterError::Protocol(e.to_string()))?;
        let id = parsed.get("id").and_then(Value::as_str).ok_or_else(|| AdapterError::Protocol("POST /session missing id".into()))?;
        *self.active_session_id.lock() = Some(id.to_string());
        self.subscribe_events();
        Ok(SessionId::from_string(id))
    }

    /// Resume by forking: the original session is left untouched and every
    /// subsequent prompt targets the fork.
    async fn load_session(&mut self, session_id: &SessionId) -> Result<(), AdapterError> {
        let addr = self.addr()?;
        let response = http::post(&self.client, &addr, &format!("/session/{}/fork", session_id.as_str()), "{}", &self.auth, PROMPT_TIMEOUT).await?;
        let parsed: Value = serde_json::from_str(&response.body).map_err(|e| AdapterError::Protocol(e.to_string()))?;
        let id = parsed.get("id").and_then(Value::as_str).ok_or_else(|| AdapterError::Protocol("fork response missing id".into()))?;
        *self.active_session_id.lock() = Some(id.to_string());
        self.subscribe_events();
        Ok(())
    }

    async fn prompt(&mut self, message: &str, attachments: &PromptAttachments) -> Result<(), AdapterError> {
        *self.operation_id.lock() = OperationId::new();
        let addr = self.addr()?;
        let session_id = self.session_id()?;
        let mut parts = vec![serde_json::json!({"type": "text", "text": message})];
        for path in &attachments.file_paths {
            parts.push(serde_json::json!({"type": "file", "path": path}));
        }
        let body = serde_json::json!({"model": self.model, "agent": self.agent_name, "variant": self.variant, "parts": parts}).to_string();
        let response = http::post(&self.client, &addr, &format!("/session/{session_id}/message"), &body, &self.auth, PROMPT_TIMEOUT).await?;
        if response.status == 401 {
            return Err(AdapterError::AuthRequired);
        }
        if response.status >= 400 {
            return Err(AdapterError::Session(format!("POST /session/{session_id}/message returned {}", response.status)));
        }
        Ok(())
    }

    async fn cancel(&mut self) -> Result<(), AdapterError> {
        let addr = self.addr()?;
        let session_id = self.session_id()?;
        let _ = http::post(&self.client, &addr, &format!("/session/{session_id}/abort"), "{}", &self.auth, ABORT_TIMEOUT).await;
        Ok(())
    }

    fn take_updates(&mut self) -> Option<mpsc::Receiver<AgentEvent>> {
        self.events_rx.take()
    }

    fn set_permission_handler(&mut self, handler: Arc<dyn PermissionHandler>) {
        *self.permission_handler.lock() = Some(handler);
    }

    /// The spawned HTTP server does not exit when stdin closes.
    fn requires_process_kill(&self) -> bool {
        true
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        if let Some(handle) = self.sse_task.lock().take() {
            handle.abort();
        }
        self.sse_active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A minimal per-capability allow/ask/deny policy document, matching
/// OpenCode's `OPENCODE_PERMISSION` rules-document shape.
fn default_permission_policy() -> String {
    serde_json::json!({"edit": "ask", "bash": "ask", "webfetch": "ask"}).to_string()
}

fn translate_sse_event(raw: &str, session_id: &str, operation_id: OperationId, state: &mut NormalizerState) -> Vec<AgentEvent> {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        tracing::debug!(raw, "dropping unrecognized opencode SSE event");
        return Vec::new();
    };
    let session_id = SessionId::from_string(session_id);
    let event_type = value.get("type").and_then(Value::as_str).unwrap_or_default();
    match event_type {
        "message.part.updated" => {
            let part = value.get("part").cloned().unwrap_or(Value::Null);
            let part_id = part.get("id").and_then(Value::as_str).unwrap_or("part").to_string();
            match part.get("type").and_then(Value::as_str) {
                Some("text") => {
                    let text = part.get("text").and_then(Value::as_str).unwrap_or_default();
                    state.advance_text(&part_id, Some(text), None).map(|suffix| vec![AgentEvent::MessageChunk { session_id, operation_id, text: suffix }]).unwrap_or_default()
                }
                Some("reasoning") => {
                    let text = part.get("text").and_then(Value::as_str).unwrap_or_default();
                    state.advance_text(&part_id, Some(text), None).map(|suffix| vec![AgentEvent::Reasoning { session_id, operation_id, reasoning_text: suffix }]).unwrap_or_default()
                }
                Some("tool") => {
                    let tool_name = part.get("tool").and_then(Value::as_str).unwrap_or("tool").to_string();
                    let input = part.get("state").and_then(|s| s.get("input")).cloned().unwrap_or(Value::Null);
                    let status = part.get("state").and_then(|s| s.get("status")).and_then(Value::as_str).map(normalize_tool_status).unwrap_or(ToolStatus::Running);
                    let payload = normalize_tool_input(&tool_name, &input);
                    let first_seen = state.observe_tool_call(&part_id);
                    if first_seen {
                        vec![AgentEvent::ToolCall { session_id, operation_id, tool_call_id: part_id, parent_tool_call_id: None, tool_name, tool_title: None, tool_status: status, normalized_payload: payload }]
                    } else {
                        vec![AgentEvent::ToolUpdate { session_id, operation_id, tool_call_id: part_id, tool_status: status, normalized_payload: payload }]
                    }
                }
                _ => Vec::new(),
            }
        }
        "session.idle" => vec![AgentEvent::Complete { session_id, operation_id }],
        "session.error" => vec![AgentEvent::Error { session_id, operation_id: Some(operation_id), message: value.get("message").and_then(Value::as_str).unwrap_or("session error").to_string() }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "opencode_tests.rs"]
mod tests;
