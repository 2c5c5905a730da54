// SPDX-License-Identifier: MIT

//! Row shape for `task_agent_execution_logs`: one entry per agent message
//! surfaced during a task's execution, ordered by `timestamp_ms` on read.

use conductor_core::TaskId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub id: u64,
    pub task_id: TaskId,
    pub agent_instance_id: String,
    pub log_level: LogLevel,
    pub message_type: String,
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub timestamp_ms: u64,
}
