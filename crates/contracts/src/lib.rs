//! # Contracts
//!
//! Frozen interface contracts shared by every telemetry crate: records,
//! batches, process roles, the control channel and the sink.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `request_start_ms` is wall-clock epoch milliseconds taken on the producing process
//! - Sink order is arrival order at the coordinator, not global event time

mod batch;
mod channel;
mod config;
mod error;
mod event;
mod runtime;
mod sink;

pub use batch::*;
pub use channel::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use runtime::*;
pub use sink::*;
