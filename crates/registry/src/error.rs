// SPDX-License-Identifier: MIT

use conductor_core::AgentTypeId;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("agent {0} is already registered")]
    DuplicateId(AgentTypeId),
    #[error("agent {0} is not registered")]
    NotFound(AgentTypeId),
    #[error("no enabled agent is available")]
    NoDefaultAgent,
    #[error(transparent)]
    Validation(#[from] conductor_core::agent::AgentValidationError),
}
