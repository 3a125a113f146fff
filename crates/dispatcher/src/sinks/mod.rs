//! Sink implementations
//!
//! Contains CsvWriter and LogSink.

mod csv;
mod log;

use std::sync::Arc;

use contracts::{RecordSink, SinkKind, SinkSettings};

pub use self::csv::{format_record, header_line, CsvWriter};
pub use self::log::LogSink;

/// Build the coordinator sink from settings
///
/// Nothing is opened here; call `RecordSink::init` once before appending.
pub fn create_sink(settings: &SinkSettings) -> Arc<dyn RecordSink> {
    match settings.kind {
        SinkKind::Csv => Arc::new(CsvWriter::new("csv", &settings.path, settings.sync_data)),
        SinkKind::Log => Arc::new(LogSink::new("log")),
    }
}
