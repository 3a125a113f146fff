//! Error types for CLI operations.

use contracts::{ContractError, NodeId};
use lifecycle::LifecycleError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Simulation parameters out of range
    #[error("Invalid run parameters: {message}")]
    InvalidArgs { message: String },

    /// A simulated process failed
    #[error("Process '{node}' failed: {source}")]
    Process {
        node: NodeId,
        #[source]
        source: LifecycleError,
    },

    /// The coordinator stopped accepting relayed batches
    #[error("Control channel delivery failed: {0}")]
    Delivery(#[source] ContractError),

    /// A producer task panicked or was cancelled
    #[error("Producer task '{node}' did not complete: {message}")]
    Join { node: NodeId, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }

    pub fn process(node: impl Into<NodeId>, source: LifecycleError) -> Self {
        Self::Process {
            node: node.into(),
            source,
        }
    }

    pub fn join(node: impl Into<NodeId>, message: impl Into<String>) -> Self {
        Self::Join {
            node: node.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
