// SPDX-License-Identifier: MIT

//! Container image configuration carried by a `RuntimeConfig`.

use serde::{Deserialize, Serialize};

/// Image/tag pair for an agent that runs containerized. Absent for agents
/// that spawn as a bare host subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: String,
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_tag() -> String {
    "latest".to_string()
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into(), tag: default_tag() }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
