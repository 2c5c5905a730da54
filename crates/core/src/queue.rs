// SPDX-License-Identifier: MIT

//! The single-slot pending-message queue attached to a session.

use crate::ids::{SessionId, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub id: String,
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub content: String,
    pub queued_by: String,
    pub queued_at_ms: u64,
}

impl QueuedMessage {
    pub fn new(
        id: impl Into<String>,
        session_id: SessionId,
        task_id: TaskId,
        content: impl Into<String>,
        queued_by: impl Into<String>,
        queued_at_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            session_id,
            task_id,
            content: content.into(),
            queued_by: queued_by.into(),
            queued_at_ms,
        }
    }
}

/// Exactly zero-or-one queued message per session. `replace` decides what
/// happens when a slot is already occupied: `true` overwrites silently,
/// `false` rejects with the existing message returned untouched.
#[derive(Debug, Clone, Default)]
pub struct MessageQueueSlot {
    pending: Option<QueuedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("a message is already queued for session {0}")]
    AlreadyQueued(SessionId),
}

impl MessageQueueSlot {
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    pub fn peek(&self) -> Option<&QueuedMessage> {
        self.pending.as_ref()
    }

    /// Enqueue `message`. Rejects when the slot is occupied and `replace` is
    /// false, leaving the existing message in place.
    pub fn enqueue(&mut self, message: QueuedMessage, replace: bool) -> Result<(), QueueError> {
        if let Some(existing) = &self.pending {
            if !replace {
                return Err(QueueError::AlreadyQueued(existing.session_id.clone()));
            }
        }
        self.pending = Some(message);
        Ok(())
    }

    /// Remove and return the pending message, if any, for dispatch on an
    /// idle transition.
    pub fn take(&mut self) -> Option<QueuedMessage> {
        self.pending.take()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
