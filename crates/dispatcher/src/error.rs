//! Dispatcher error types

use contracts::Role;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Operation reserved for the other role
    #[error("'{operation}' is not allowed on a {role} process")]
    RoleMismatch { operation: &'static str, role: Role },

    /// Sink, channel or codec error (from contract)
    #[error("dispatch error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a role mismatch error
    pub fn role_mismatch(operation: &'static str, role: Role) -> Self {
        Self::RoleMismatch { operation, role }
    }

    /// Whether the error comes from the coordinator sink
    pub fn is_sink_failure(&self) -> bool {
        match self {
            Self::Contract(e) => e.is_sink_failure(),
            Self::Io(_) | Self::SinkCreation { .. } => true,
            Self::RoleMismatch { .. } => false,
        }
    }
}
