// SPDX-License-Identifier: MIT

//! Matches outstanding request ids to their eventual response, for dialects
//! where the subprocess also initiates requests back at the adapter (ACP's
//! `session/request_permission`, stream-json's `control_request`).

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct Correlator<T> {
    waiters: Mutex<HashMap<String, oneshot::Sender<T>>>,
}

impl<T> Correlator<T> {
    pub fn new() -> Self {
        Self { waiters: Mutex::new(HashMap::new()) }
    }

    /// Register a wait for `id`, returning the receiving half. Call before
    /// the request that will produce this id's response is sent, to avoid
    /// a race against an immediate reply.
    pub fn wait_for(&self, id: impl Into<String>) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().insert(id.into(), tx);
        rx
    }

    /// Deliver a response keyed by `id`. Returns `false` if nothing is
    /// waiting on that id (stale or unsolicited response).
    pub fn resolve(&self, id: &str, value: T) -> bool {
        if let Some(tx) = self.waiters.lock().remove(id) {
            tx.send(value).is_ok()
        } else {
            false
        }
    }

    /// Drop every outstanding waiter (e.g. on cancellation or connection loss).
    pub fn clear(&self) {
        self.waiters.lock().clear();
    }

    pub fn outstanding_count(&self) -> usize {
        self.waiters.lock().len()
    }
}

#[cfg(test)]
#[path = "correlator_tests.rs"]
mod tests;
