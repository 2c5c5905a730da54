// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Transport adapters: one per agent dialect (ACP, stream-json, codex,
//! opencode), each translating a subprocess's wire protocol into the
//! canonical `AgentEvent` stream behind the shared `TransportAdapter` trait.

pub mod acp;
pub mod codex;
pub mod correlator;
pub mod error;
pub mod http;
pub mod normalize;
pub mod opencode;
pub mod passthrough;
pub mod stream_json;
pub mod tool_call;
pub mod transport;

pub use error::AdapterError;
pub use transport::{PermissionAsk, PermissionHandler, PermissionReply, PromptAttachments, TransportAdapter, MIN_EVENT_CHANNEL_CAPACITY};
