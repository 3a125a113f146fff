//! LogSink - logs batch summaries via tracing

use contracts::{Batch, ContractError, RecordSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::metrics::WriterMetrics;

/// Sink that logs batch summaries instead of persisting them
pub struct LogSink {
    name: String,
    initialized: AtomicBool,
    metrics: Arc<WriterMetrics>,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialized: AtomicBool::new(false),
            metrics: Arc::new(WriterMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    fn log_batch_summary(&self, batch: &Batch) {
        let failures = batch.iter().filter(|r| r.is_failure()).count();

        info!(
            sink = %self.name,
            origin = %batch.origin(),
            records = batch.len(),
            failures,
            "Batch received"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_init", skip(self), fields(sink = %self.name))]
    fn init(&self) -> Result<(), ContractError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(ContractError::sink_state(&self.name, "already initialized"));
        }
        info!(sink = %self.name, "LogSink initialized");
        Ok(())
    }

    fn append(&self, batch: &Batch) -> Result<(), ContractError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(ContractError::sink_state(&self.name, "append before init"));
        }
        if batch.is_empty() {
            return Ok(());
        }
        self.log_batch_summary(batch);
        self.metrics.inc_written(batch.len());
        Ok(())
    }
}
