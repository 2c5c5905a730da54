// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("failed to spawn agent subprocess: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("subprocess exited before completing startup: {0}")]
    FatalStartupExit(String),
    #[error("protocol handshake failed: {0}")]
    Handshake(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("authentication required")]
    AuthRequired,
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed protocol message: {0}")]
    Protocol(String),
}
