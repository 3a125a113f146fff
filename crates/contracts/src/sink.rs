//! RecordSink trait - Writer interface
//!
//! Defines the abstract interface for the coordinator's durable sink.

use crate::{Batch, ContractError};

/// Column names of the record log, in order
pub const CSV_HEADERS: [&str; 6] = [
    "endpoint",
    "status_code",
    "request_start_ms",
    "response_duration_ms",
    "error_type",
    "error_message",
];

/// Durable record output
///
/// Methods take `&self`: implementations guard their handle internally so
/// the local dispatch path and the inbound message handler can share one
/// sink.
pub trait RecordSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Open the sink fresh and write the header
    ///
    /// # Errors
    /// Returns open/write errors; must be called exactly once.
    fn init(&self) -> Result<(), ContractError>;

    /// Append every record of `batch`, in order, as one contiguous block
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn append(&self, batch: &Batch) -> Result<(), ContractError>;
}
