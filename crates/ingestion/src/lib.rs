//! # Ingestion
//!
//! Request outcome ingestion module.
//!
//! Responsibilities:
//! - Convert request outcomes into `EventRecord`s
//! - Buffer records per process and flush them in batches
//! - Mock request source for runs without a target service
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{Batcher, RequestOutcome};
//!
//! let mut batcher = Batcher::new("worker-1", 5, dispatcher);
//! batcher.record(RequestOutcome::started_now("/", Some(200), 12.0, None).into())?;
//! // ... at test stop
//! batcher.force_flush()?;
//! ```

mod batcher;
mod mock;
mod outcome;

// Re-exports
pub use batcher::{Batcher, BatcherStats};
pub use contracts::EventRecord;
pub use mock::{MockRequestConfig, MockRequestSource};
pub use outcome::{now_ms, RequestOutcome};
