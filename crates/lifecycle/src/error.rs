//! Lifecycle error types

use contracts::ContractError;
use dispatcher::DispatcherError;
use thiserror::Error;

use crate::state::LifecycleState;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Event not allowed in the current state
    #[error("cannot handle '{event}' while {from}")]
    InvalidTransition {
        from: LifecycleState,
        event: &'static str,
    },

    /// Routing or sink error
    #[error(transparent)]
    Dispatch(#[from] DispatcherError),

    /// Sink or channel error raised during wiring
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl LifecycleError {
    pub fn invalid_transition(from: LifecycleState, event: &'static str) -> Self {
        Self::InvalidTransition { from, event }
    }

    /// Whether the coordinator sink failed (fatal)
    pub fn is_sink_failure(&self) -> bool {
        match self {
            Self::Dispatch(e) => e.is_sink_failure(),
            Self::Contract(e) => e.is_sink_failure(),
            Self::InvalidTransition { .. } => false,
        }
    }
}
