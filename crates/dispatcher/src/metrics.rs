//! Dispatcher and writer counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one sink
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Batches appended
    batches_written: AtomicU64,
    /// Lines appended (header excluded)
    records_written: AtomicU64,
    /// Failed init/append calls
    failure_count: AtomicU64,
}

impl WriterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one appended batch of `records` lines
    pub fn inc_written(&self, records: usize) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.records_written
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> WriterSnapshot {
        WriterSnapshot {
            batches_written: self.batches_written(),
            records_written: self.records_written(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of writer metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterSnapshot {
    pub batches_written: u64,
    pub records_written: u64,
    pub failure_count: u64,
}

/// Counters for one Dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    dispatched: AtomicU64,
    sent: AtomicU64,
    send_failures: AtomicU64,
    written_local: AtomicU64,
    received_remote: AtomicU64,
    decode_failures: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_written_local(&self) {
        self.written_local.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_received_remote(&self) {
        self.received_remote.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            written_local: self.written_local.load(Ordering::Relaxed),
            received_remote: self.received_remote.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    /// Batches passed to `dispatch`
    pub dispatched: u64,
    /// Batches handed to the control channel
    pub sent: u64,
    /// Batches the control channel refused (lost)
    pub send_failures: u64,
    /// Local batches appended to the sink
    pub written_local: u64,
    /// Remote batches appended to the sink
    pub received_remote: u64,
    /// Inbound payloads dropped because they did not decode
    pub decode_failures: u64,
}
