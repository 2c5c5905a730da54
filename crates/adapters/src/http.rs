// SPDX-License-Identifier: MIT

//! HTTP client for talking to a locally-spawned OpenCode server: plain
//! request/response calls plus a long-lived `GET /event` SSE subscription.

use crate::error::AdapterError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use std::time::Duration;

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

pub async fn get(client: &Client, addr: &str, path: &str, auth: &BasicAuth, timeout: Duration) -> Result<HttpResponse, AdapterError> {
    let send = client.get(format!("http://{addr}{path}")).header("Authorization", auth.header_value()).send();
    let response = tokio::time::timeout(timeout, send).await.map_err(|_| AdapterError::Timeout(timeout))?.map_err(|e| AdapterError::Session(format!("request failed: {e}")))?;
    to_http_response(response).await
}

pub async fn post(client: &Client, addr: &str, path: &str, body: &str, auth: &BasicAuth, timeout: Duration) -> Result<HttpResponse, AdapterError> {
    let send = client
        .post(format!("http://{addr}{path}"))
        .header("Authorization", auth.header_value())
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send();
    let response = tokio::time::timeout(timeout, send).await.map_err(|_| AdapterError::Timeout(timeout))?.map_err(|e| AdapterError::Session(format!("request failed: {e}")))?;
    to_http_response(response).await
}

async fn to_http_response(response: reqwest::Response) -> Result<HttpResponse, AdapterError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| AdapterError::Session(format!("read body failed: {e}")))?;
    Ok(HttpResponse { status, body })
}

/// HTTP Basic credentials. OpenCode's password is a freshly generated
/// high-entropy token placed in `OPENCODE_SERVER_PASSWORD`, not a secret
/// the user ever types in.
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }

    fn header_value(&self) -> String {
        format!("Basic {}", self.encode())
    }
}

/// A subscription to OpenCode's `/event` SSE stream, read one `data:` entry
/// at a time as chunks arrive over the open connection.
pub struct EventStream {
    response: reqwest::Response,
    buf: String,
}

pub async fn open_event_stream(client: &Client, addr: &str, path: &str, auth: &BasicAuth) -> Result<EventStream, AdapterError> {
    let response = client
        .get(format!("http://{addr}{path}"))
        .header("Authorization", auth.header_value())
        .header("Accept", "text/event-stream")
        .send()
        .await
        .map_err(|e| AdapterError::Session(format!("connect failed: {e}")))?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(AdapterError::Session(format!("event stream returned status {status}")));
    }
    Ok(EventStream { response, buf: String::new() })
}

impl EventStream {
    /// Read one `data: <payload>` entry, skipping blank keep-alive lines and
    /// `event:`/`id:` framing lines. Returns `None` once the connection closes.
    pub async fn next_data(&mut self) -> Result<Option<String>, AdapterError> {
        loop {
            if let Some(pos) = self.buf.find('\n') {
                let line = self.buf[..pos].trim_end_matches('\r').to_string();
                self.buf.drain(..=pos);
                if let Some(data) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) {
                    return Ok(Some(data.to_string()));
                }
                continue;
            }
            match self.response.chunk().await.map_err(|e| AdapterError::Session(format!("read event failed: {e}")))? {
                Some(chunk) => self.buf.push_str(&String::from_utf8_lossy(&chunk)),
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
