//! # Lifecycle
//!
//! Per-process telemetry state machine.
//!
//! Responsibilities:
//! - Resolve the process role at init
//! - Wire Batcher, Dispatcher and (coordinator only) the sink
//! - Record request outcomes while active
//! - Flush the residual buffer at test stop
//!
//! ## Usage Example
//!
//! ```ignore
//! use lifecycle::ProcessTelemetry;
//!
//! let mut telemetry = ProcessTelemetry::new(config);
//! telemetry.on_init(&topology, channel)?;
//! telemetry.on_request(outcome)?;
//! let report = telemetry.on_test_stop()?;
//! telemetry.terminate()?;
//! ```

mod error;
mod process;
mod state;

pub use error::LifecycleError;
pub use process::{ProcessTelemetry, RunReport};
pub use state::LifecycleState;
