//! ControlChannel trait - producer to coordinator transport
//!
//! Reliable, ordered, fire-and-forget message transport. The transport
//! itself is provided by the host harness; this crate only fixes its shape.

use std::sync::Arc;

use bytes::Bytes;

use crate::{ContractError, NodeId};

/// Topic used to relay event batches
pub const SEND_EVENTS_TOPIC: &str = "send_events";

/// Message delivered to a registered handler
#[derive(Debug, Clone)]
pub struct ControlMessage {
    /// Topic the message was sent under
    pub topic: String,
    /// Sending process, stamped by the transport
    pub sender: NodeId,
    /// Opaque payload
    pub payload: Bytes,
}

/// Inbound message handler
///
/// Invoked once per message, in arrival order. An error means the
/// receiving side can no longer make progress (e.g. sink failure).
pub type MessageHandler = Arc<dyn Fn(ControlMessage) -> Result<(), ContractError> + Send + Sync>;

/// Control-plane transport between processes
pub trait ControlChannel: Send + Sync {
    /// Send a payload under `topic` without waiting for delivery
    ///
    /// # Errors
    /// Only local enqueue failures (e.g. the channel is closed).
    fn send(&self, topic: &str, payload: Bytes) -> Result<(), ContractError>;

    /// Register the handler for `topic` (coordinator only)
    fn register_handler(&self, topic: &str, handler: MessageHandler) -> Result<(), ContractError>;
}
