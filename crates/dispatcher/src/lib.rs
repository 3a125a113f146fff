//! # Dispatcher
//!
//! Role-aware routing of flushed batches.
//!
//! Responsibilities:
//! - Producer: encode batches and relay them over the control channel
//! - Coordinator: append local and relayed batches to the sink
//! - CSV sink with whole-batch atomic appends
//! - In-process control channel for single-process runs

pub mod channel;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;

pub use channel::{ChannelEndpoint, DeliveryStats, LocalControlChannel};
pub use codec::{decode_batch, encode_batch};
pub use contracts::{Batch, RecordSink};
pub use dispatcher::Dispatcher;
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, DispatchSnapshot, WriterMetrics, WriterSnapshot};
pub use sinks::{create_sink, format_record, header_line, CsvWriter, LogSink};
