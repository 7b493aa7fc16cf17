// src/registry/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),
    #[error("delegation not found: {0}")]
    DelegationNotFound(String),
    #[error("workflow '{workflow}' step {step}: no agent offers capability '{capability}'")]
    NoCapableAgent {
        workflow: String,
        step: usize,
        capability: String,
    },
}

impl RegistryError {
    /// True for unknown agent / delegation ids.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::AgentNotFound(_) | RegistryError::DelegationNotFound(_)
        )
    }
}
