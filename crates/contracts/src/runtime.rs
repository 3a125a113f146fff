//! Runtime topology - process role resolution
//!
//! Each process is either the single coordinator or one of many producers.
//! The role is read once at initialization and never changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process identifier as seen by the control channel
pub type NodeId = String;

/// Process role within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns the sink and aggregates every batch
    Coordinator,
    /// Relays its batches to the coordinator
    Producer,
}

impl Role {
    /// Resolve the role from a topology
    pub fn from_topology(topology: &dyn Topology) -> Self {
        if topology.is_coordinator() {
            Self::Coordinator
        } else {
            Self::Producer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Producer => "producer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime topology collaborator
///
/// Answers "is this process the coordinator?" for the process lifetime.
pub trait Topology: Send + Sync {
    /// This process identifier
    fn node_id(&self) -> &str;

    /// Whether this process is the coordinator
    fn is_coordinator(&self) -> bool;
}

/// Topology fixed at construction
#[derive(Debug, Clone)]
pub struct StaticTopology {
    node_id: NodeId,
    coordinator: bool,
}

impl StaticTopology {
    pub fn coordinator(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            coordinator: true,
        }
    }

    pub fn producer(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            coordinator: false,
        }
    }
}

impl Topology for StaticTopology {
    fn node_id(&self) -> &str {
        &self.node_id
    }

    fn is_coordinator(&self) -> bool {
        self.coordinator
    }
}
