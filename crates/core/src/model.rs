// SPDX-License-Identifier: MIT

//! Model listing entries contributed by an `Agent` catalog entry.

use serde::{Deserialize, Serialize};

/// Where a `Model` entry came from. A dynamic list (probed from the agent
/// binary at runtime) falls back to the static list on parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub display_name: String,
    pub provider: String,
    pub context_window: u32,
    pub is_default: bool,
    pub source: ModelSource,
}

impl Model {
    pub fn static_entry(
        id: impl Into<String>,
        display_name: impl Into<String>,
        provider: impl Into<String>,
        context_window: u32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider: provider.into(),
            context_window,
            is_default: false,
            source: ModelSource::Static,
        }
    }

    pub fn default_model(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Resolve a dynamic model list, falling back to `static_models` when the
/// dynamic probe's output failed to parse (empty result).
pub fn resolve_models(static_models: &[Model], dynamic_models: Vec<Model>) -> Vec<Model> {
    if dynamic_models.is_empty() {
        static_models.to_vec()
    } else {
        dynamic_models
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
