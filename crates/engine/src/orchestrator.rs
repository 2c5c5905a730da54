// SPDX-License-Identifier: MIT

//! Per-session state machine: `starting -> running <-> waiting_for_input ->
//! (completed|failed|cancelled)`, with a single-slot pending-message queue
//! and restart recovery. Subprocess plumbing lives behind `TransportAdapter`
//! trait objects handed in by the caller; this module owns only the state
//! transitions and dispatch ordering described in the session contract.

use crate::error::OrchestratorError;
use conductor_adapters::TransportAdapter;
use conductor_core::{MessageQueueSlot, QueuedMessage, Session, SessionId, SessionState, TaskId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

const RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);

struct SessionEntry {
    session: Session,
    queue: MessageQueueSlot,
    adapter: Arc<AsyncMutex<Box<dyn TransportAdapter>>>,
}

/// Tracks every live session and its single-slot message queue. Per-session
/// mutation is serialized through the session's own adapter mutex; the map
/// itself is a short-critical-section `parking_lot::Mutex` matching the
/// registry's read-mostly sibling.
#[derive(Default)]
pub struct SessionOrchestrator {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, session: Session, adapter: Box<dyn TransportAdapter>) {
        let entry = SessionEntry { session, queue: MessageQueueSlot::default(), adapter: Arc::new(AsyncMutex::new(adapter)) };
        self.sessions.lock().insert(entry.session.session_id, entry);
    }

    pub fn session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.lock().get(session_id).map(|e| e.session.clone())
    }

    fn set_state(&self, session_id: &SessionId, state: SessionState, now_ms: u64) {
        if let Some(entry) = self.sessions.lock().get_mut(session_id) {
            entry.session.state = state;
            entry.session.last_touched_ms = now_ms;
        }
    }

    /// Submit a prompt. While `running`, the message is queued (rejected if
    /// a slot is already occupied and `replace` is false) rather than sent
    /// immediately; while idle it dispatches at once.
    pub async fn submit_prompt(&self, session_id: &SessionId, content: &str, queued_by: &str, replace: bool, now_ms: u64) -> Result<(), OrchestratorError> {
        let (state, adapter, task_id) = {
            let sessions = self.sessions.lock();
            let entry = sessions.get(session_id).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?;
            (entry.session.state, entry.adapter.clone(), entry.session.task_id)
        };

        if state.is_idle() {
            self.dispatch(session_id, &adapter, content, now_ms).await
        } else {
            let message = QueuedMessage::new(format!("{session_id}-q"), *session_id, task_id, content, queued_by, now_ms);
            let mut sessions = self.sessions.lock();
            let entry = sessions.get_mut(session_id).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?;
            entry.queue.enqueue(message, replace).map_err(|e| OrchestratorError::Conflict(e.to_string()))
        }
    }

    async fn dispatch(&self, session_id: &SessionId, adapter: &Arc<AsyncMutex<Box<dyn TransportAdapter>>>, content: &str, now_ms: u64) -> Result<(), OrchestratorError> {
        self.set_state(session_id, SessionState::Running, now_ms);
        tracing::info!(%session_id, "dispatching prompt");
        let mut guard = adapter.lock().await;
        let result = guard.prompt(content, &conductor_adapters::PromptAttachments::default()).await;
        drop(guard);
        if let Err(e) = &result {
            tracing::error!(%session_id, error = %e, "prompt failed");
        }
        result?;
        self.on_idle(session_id, now_ms).await
    }

    /// Called when a turn reaches idle: flips to `waiting_for_input`, then
    /// dispatches a queued message if one is present. A reset-in-progress
    /// caller should retry `submit_prompt` rather than call this directly —
    /// the queued slot is never dropped, only ever taken for dispatch.
    pub async fn on_idle(&self, session_id: &SessionId, now_ms: u64) -> Result<(), OrchestratorError> {
        self.set_state(session_id, SessionState::WaitingForInput, now_ms);
        let next = {
            let mut sessions = self.sessions.lock();
            let entry = sessions.get_mut(session_id).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?;
            entry.queue.take()
        };
        let Some(queued) = next else { return Ok(()) };
        let adapter = self.sessions.lock().get(session_id).map(|e| e.adapter.clone()).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?;
        Box::pin(self.dispatch(session_id, &adapter, &queued.content, now_ms)).await
    }

    /// Context cancellation cascades to the adapter's own `cancel`, then to
    /// process termination when the dialect can't be stopped by protocol
    /// message alone (OpenCode's spawned HTTP server).
    pub async fn cancel(&self, session_id: &SessionId, now_ms: u64) -> Result<(), OrchestratorError> {
        let adapter = {
            let sessions = self.sessions.lock();
            sessions.get(session_id).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?.adapter.clone()
        };
        let mut guard = adapter.lock().await;
        guard.cancel().await?;
        if guard.requires_process_kill() {
            tracing::warn!(%session_id, "dialect has no in-band cancel, killing process");
            guard.close().await?;
        }
        drop(guard);
        self.set_state(session_id, SessionState::Cancelled, now_ms);
        Ok(())
    }

    /// Restart recovery: for a session whose `SessionConfig` supports it,
    /// attempt `load_session` within a bounded timeout; otherwise the caller
    /// should create a fresh session instead of calling this.
    pub async fn recover(&self, session_id: &SessionId, now_ms: u64) -> Result<(), OrchestratorError> {
        let adapter = {
            let sessions = self.sessions.lock();
            sessions.get(session_id).ok_or_else(|| OrchestratorError::NotFound(session_id.to_string()))?.adapter.clone()
        };
        let mut guard = adapter.lock().await;
        let result = tokio::time::timeout(RECOVERY_TIMEOUT, guard.load_session(session_id)).await;
        drop(guard);
        match result {
            Ok(Ok(())) => {
                if let Some(entry) = self.sessions.lock().get_mut(session_id) {
                    entry.session.recovered = true;
                }
                self.set_state(session_id, SessionState::WaitingForInput, now_ms);
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(%session_id, error = %e, "session recovery failed");
                self.set_state(session_id, SessionState::Failed, now_ms);
                Err(e.into())
            }
            Err(_) => {
                tracing::error!(%session_id, timeout_secs = RECOVERY_TIMEOUT.as_secs(), "session recovery timed out");
                self.set_state(session_id, SessionState::Failed, now_ms);
                Err(OrchestratorError::Adapter(conductor_adapters::AdapterError::Timeout(RECOVERY_TIMEOUT)))
            }
        }
    }

    pub fn queued_message(&self, session_id: &SessionId) -> Option<QueuedMessage> {
        self.sessions.lock().get(session_id).and_then(|e| e.queue.peek().cloned())
    }

    pub fn remove(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.lock().remove(session_id).map(|e| e.session)
    }

    pub fn active_task_ids(&self) -> Vec<TaskId> {
        self.sessions.lock().values().map(|e| e.session.task_id).collect()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
