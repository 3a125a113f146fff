//! Batcher - per-process record buffer
//!
//! Buffers EventRecords and decides when they leave the process. The
//! policy is the same on every process; where a batch goes is the
//! outlet's business.

use contracts::{Batch, BatchOutlet, EventRecord, NodeId, DEFAULT_BATCH_THRESHOLD};
use observability::{FlushReason, FlushStatsAggregator};
use tracing::{debug, instrument, trace};

/// Batcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// Records passed to `record`
    pub recorded: u64,
    /// Flushes triggered by the threshold
    pub threshold_flushes: u64,
    /// Non-empty flushes triggered by `force_flush`
    pub forced_flushes: u64,
    /// Records handed to the outlet
    pub flushed_records: u64,
}

/// Threshold-driven record buffer
pub struct Batcher<O: BatchOutlet> {
    origin: NodeId,
    threshold: usize,
    buffer: Vec<EventRecord>,
    outlet: O,
    stats: BatcherStats,
    flushes: FlushStatsAggregator,
}

impl<O: BatchOutlet> Batcher<O> {
    /// Create a batcher flushing every `threshold` records
    ///
    /// A threshold of 0 is treated as 1.
    pub fn new(origin: impl Into<NodeId>, threshold: usize, outlet: O) -> Self {
        let threshold = threshold.max(1);
        Self {
            origin: origin.into(),
            threshold,
            buffer: Vec::with_capacity(threshold),
            outlet,
            stats: BatcherStats::default(),
            flushes: FlushStatsAggregator::new(),
        }
    }

    /// Create a batcher with the default threshold
    pub fn with_default_threshold(origin: impl Into<NodeId>, outlet: O) -> Self {
        Self::new(origin, DEFAULT_BATCH_THRESHOLD, outlet)
    }

    /// Buffer one record, flushing if the threshold is reached
    ///
    /// # Errors
    /// Propagates the outlet error. The flushed records are not kept.
    pub fn record(&mut self, record: EventRecord) -> Result<(), O::Error> {
        self.buffer.push(record);
        self.stats.recorded += 1;
        observability::record_event_recorded();
        trace!(origin = %self.origin, buffered = self.buffer.len(), "record buffered");

        if self.buffer.len() >= self.threshold {
            self.flush(FlushReason::Threshold)?;
        }
        Ok(())
    }

    /// Flush whatever is buffered; no-op when empty
    ///
    /// Returns the size of the flushed batch, if any.
    #[instrument(name = "batcher_force_flush", skip(self), fields(origin = %self.origin))]
    pub fn force_flush(&mut self) -> Result<Option<usize>, O::Error> {
        if self.buffer.is_empty() {
            debug!("nothing buffered, skipping forced flush");
            return Ok(None);
        }
        self.flush(FlushReason::Forced)
    }

    /// Swap the buffer out and hand it to the outlet
    fn flush(&mut self, reason: FlushReason) -> Result<Option<usize>, O::Error> {
        let records = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.threshold));
        let Some(batch) = Batch::from_records(self.origin.clone(), records) else {
            return Ok(None);
        };
        let size = batch.len();

        self.outlet.accept(batch)?;

        match reason {
            FlushReason::Threshold => self.stats.threshold_flushes += 1,
            FlushReason::Forced => self.stats.forced_flushes += 1,
        }
        self.stats.flushed_records += size as u64;
        self.flushes.update(reason, size);
        observability::record_batch_flushed(reason, size);
        debug!(origin = %self.origin, reason = reason.as_str(), records = size, "batch flushed");

        Ok(Some(size))
    }

    /// Records currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn stats(&self) -> BatcherStats {
        self.stats
    }

    /// Flush size distribution
    pub fn flush_stats(&self) -> &FlushStatsAggregator {
        &self.flushes
    }

    pub fn outlet(&self) -> &O {
        &self.outlet
    }
}
