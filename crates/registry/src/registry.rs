// SPDX-License-Identifier: MIT

//! Thread-safe catalog of registered agent types.

use crate::error::RegistryError;
use conductor_core::{agent::validate_agent, Agent, AgentTypeId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

struct Entry {
    agent: Agent,
    insertion_index: usize,
}

/// Read-mostly map from `AgentTypeId` to `Agent`, guarded by a single
/// `RwLock` since reads (listing, lookup during command composition) vastly
/// outnumber writes (registration at startup).
#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    agents: HashMap<AgentTypeId, Entry>,
    next_index: usize,
}

pub const DEFAULT_AGENT_NAME: &str = "auggie";

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register `agent`. Fails if `agent.id` is already present
    /// or validation (§6) fails.
    pub fn register(&self, agent: Agent) -> Result<(), RegistryError> {
        validate_agent(&agent)?;
        let mut inner = self.inner.write();
        if inner.agents.contains_key(&agent.id) {
            return Err(RegistryError::DuplicateId(agent.id));
        }
        let insertion_index = inner.next_index;
        inner.next_index += 1;
        inner.agents.insert(agent.id.clone(), Entry { agent, insertion_index });
        Ok(())
    }

    pub fn unregister(&self, id: &AgentTypeId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        inner.agents.remove(id).map(|_| ()).ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    pub fn get(&self, id: &AgentTypeId) -> Option<Agent> {
        self.inner.read().agents.get(id).map(|e| e.agent.clone())
    }

    pub fn exists(&self, id: &AgentTypeId) -> bool {
        self.inner.read().agents.contains_key(id)
    }

    /// All registered agents, stably sorted by `(display_order, insertion_index)`.
    pub fn list(&self) -> Vec<Agent> {
        let inner = self.inner.read();
        let mut entries: Vec<&Entry> = inner.agents.values().collect();
        entries.sort_by_key(|e| (e.agent.display_order, e.insertion_index));
        entries.into_iter().map(|e| e.agent.clone()).collect()
    }

    pub fn list_enabled(&self) -> Vec<Agent> {
        self.list().into_iter().filter(|a| a.enabled).collect()
    }

    /// `auggie` if present and enabled, else the first enabled agent in
    /// `list()` order, else `NoDefaultAgent`.
    pub fn get_default(&self) -> Result<Agent, RegistryError> {
        let enabled = self.list_enabled();
        if let Some(auggie) = enabled.iter().find(|a| a.name == DEFAULT_AGENT_NAME) {
            return Ok(auggie.clone());
        }
        enabled.into_iter().next().ok_or(RegistryError::NoDefaultAgent)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
