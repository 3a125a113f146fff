//! Batch - Batcher output
//!
//! A non-empty, ordered group of EventRecords flushed together.

use serde::{Deserialize, Serialize};

use crate::{EventRecord, NodeId};

/// Ordered, non-empty group of records
///
/// `origin` identifies the process that produced the batch. It is used for
/// diagnostics only and never reaches the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    origin: NodeId,
    records: Vec<EventRecord>,
}

impl Batch {
    /// Build a batch, `None` if `records` is empty
    pub fn from_records(origin: impl Into<NodeId>, records: Vec<EventRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        Some(Self {
            origin: origin.into(),
            records,
        })
    }

    /// Producing process
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a batch built through `from_records`; a decoded
    /// payload may still be empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}

/// Destination of flushed batches
///
/// Implemented by the Dispatcher. The Batcher only knows this trait, so
/// the buffering policy is identical on every process.
pub trait BatchOutlet {
    type Error;

    /// Take ownership of a flushed batch
    fn accept(&self, batch: Batch) -> Result<(), Self::Error>;
}
