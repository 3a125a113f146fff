//! Telemetry pipeline metrics
//!
//! Thin wrappers over the `metrics` facade plus an in-memory aggregator
//! used for end-of-run summaries.

use metrics::{counter, histogram};

/// Why a batch left the Batcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Buffer reached the threshold
    Threshold,
    /// Process shutdown
    Forced,
}

impl FlushReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Forced => "forced",
        }
    }
}

/// Where a written batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    /// Coordinator's own flush
    Local,
    /// Relayed by a producer over the control channel
    Remote,
}

impl BatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Record one EventRecord entering a Batcher
pub fn record_event_recorded() {
    counter!("loadtel_events_recorded_total").increment(1);
}

/// Record a Batcher flush
pub fn record_batch_flushed(reason: FlushReason, size: usize) {
    counter!("loadtel_batches_flushed_total", "reason" => reason.as_str()).increment(1);
    histogram!("loadtel_batch_size").record(size as f64);
}

/// Record a batch handed to the control channel
pub fn record_batch_sent(success: bool) {
    if success {
        counter!("loadtel_batches_sent_total").increment(1);
    } else {
        counter!("loadtel_batch_send_failures_total").increment(1);
    }
}

/// Record a batch appended to the sink
pub fn record_batch_written(source: BatchSource, size: usize) {
    counter!("loadtel_batches_written_total", "source" => source.as_str()).increment(1);
    counter!("loadtel_records_written_total").increment(size as u64);
}

/// Flush statistics aggregator
///
/// Aggregates in memory so a run can print a summary without a recorder.
#[derive(Debug, Clone, Default)]
pub struct FlushStatsAggregator {
    /// Threshold-driven flushes
    pub threshold_flushes: u64,

    /// Shutdown flushes
    pub forced_flushes: u64,

    /// Records across all flushes
    pub total_records: u64,

    /// Batch size distribution
    pub batch_sizes: RunningStats,
}

impl FlushStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one flush
    pub fn update(&mut self, reason: FlushReason, size: usize) {
        match reason {
            FlushReason::Threshold => self.threshold_flushes += 1,
            FlushReason::Forced => self.forced_flushes += 1,
        }
        self.total_records += size as u64;
        self.batch_sizes.push(size as f64);
    }

    /// Merge another aggregator (e.g. one per process)
    pub fn merge(&mut self, other: &FlushStatsAggregator) {
        self.threshold_flushes += other.threshold_flushes;
        self.forced_flushes += other.forced_flushes;
        self.total_records += other.total_records;
        self.batch_sizes.merge(&other.batch_sizes);
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(&self.batch_sizes)
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Combine two streams (Chan et al. parallel update)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / total as f64;
        self.m2 += other.m2 + delta * delta * (self.count * other.count) as f64 / total as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = total;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_running_stats_merge_matches_sequential() {
        let mut a = RunningStats::default();
        let mut b = RunningStats::default();
        let mut all = RunningStats::default();
        for v in [5.0, 5.0, 2.0] {
            a.push(v);
            all.push(v);
        }
        for v in [5.0, 1.0] {
            b.push(v);
            all.push(v);
        }

        a.merge(&b);
        assert_eq!(a.count(), all.count());
        assert!((a.mean() - all.mean()).abs() < 1e-10);
        assert!((a.variance() - all.variance()).abs() < 1e-10);
        assert!((a.min() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut agg = FlushStatsAggregator::new();
        agg.update(FlushReason::Threshold, 5);
        agg.update(FlushReason::Threshold, 5);
        agg.update(FlushReason::Forced, 2);

        assert_eq!(agg.threshold_flushes, 2);
        assert_eq!(agg.forced_flushes, 1);
        assert_eq!(agg.total_records, 12);
        assert_eq!(agg.summary().count, 3);
    }

    #[test]
    fn test_summary_display() {
        let empty = StatsSummary::default();
        assert_eq!(empty.to_string(), "N/A");

        let mut agg = FlushStatsAggregator::new();
        agg.update(FlushReason::Threshold, 5);
        assert!(agg.summary().to_string().contains("n=1"));
    }

    #[test]
    fn test_metric_calls_without_recorder() {
        // No recorder installed: the facade must be a no-op
        record_event_recorded();
        record_batch_flushed(FlushReason::Forced, 3);
        record_batch_sent(false);
        record_batch_written(BatchSource::Remote, 3);
    }
}
