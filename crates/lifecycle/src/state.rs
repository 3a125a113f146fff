//! Per-process lifecycle states

use std::fmt;

/// Lifecycle state of one process
///
/// `Uninitialized -> Active -> Draining -> Terminated`, no other moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Before `on_init`
    #[default]
    Uninitialized,
    /// Accepting records
    Active,
    /// Test stopped, residual buffer flushed
    Draining,
    /// Process exit acknowledged
    Terminated,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
