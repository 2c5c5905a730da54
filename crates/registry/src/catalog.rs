// SPDX-License-Identifier: MIT

//! Loading the embedded `agents.json` catalog shape.
//!
//! Both a code-defined catalog and a JSON-embedded one are valid inputs;
//! both funnel through [`AgentRegistry::register`] so validation runs
//! identically regardless of source.

use crate::error::RegistryError;
use crate::registry::AgentRegistry;
use conductor_core::Agent;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[allow(dead_code)]
    version: u32,
    agents: Vec<Agent>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse agent catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Parse the `{version, agents: [...]}` document shape and return the
/// parsed entries without registering them.
pub fn load_embedded_json(raw: &str) -> Result<Vec<Agent>, CatalogError> {
    let document: CatalogDocument = serde_json::from_str(raw)?;
    Ok(document.agents)
}

/// Parse and register every entry from an embedded catalog document.
pub fn load_and_register(registry: &AgentRegistry, raw: &str) -> Result<(), CatalogError> {
    for agent in load_embedded_json(raw)? {
        registry.register(agent)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
