//! Run statistics and summary output.

use std::time::Duration;

use contracts::{SinkKind, SinkSettings};
use dispatcher::DeliveryStats;
use lifecycle::RunReport;
use observability::FlushStatsAggregator;

/// Statistics from a simulated run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Coordinator report (local batches and relayed batches written)
    pub coordinator: RunReport,

    /// One report per producer, in worker order
    pub producers: Vec<RunReport>,

    /// Control channel delivery counters
    pub delivery: DeliveryStats,

    /// Sink the coordinator wrote to
    pub sink: SinkSettings,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunStats {
    fn reports(&self) -> impl Iterator<Item = &RunReport> {
        std::iter::once(&self.coordinator).chain(self.producers.iter())
    }

    /// Records recorded across every process
    pub fn total_recorded(&self) -> u64 {
        self.reports().map(|r| r.batcher.recorded).sum()
    }

    /// Batches the producers failed to relay
    pub fn lost_batches(&self) -> u64 {
        self.producers.iter().map(|r| r.dispatch.send_failures).sum()
    }

    /// Flush statistics merged over every process
    pub fn flushes(&self) -> FlushStatsAggregator {
        let mut merged = FlushStatsAggregator::new();
        for report in self.reports() {
            merged.merge(&report.flushes);
        }
        merged
    }

    /// Records per second of wall-clock time
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total_recorded() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let flushes = self.flushes();

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Processes: 1 coordinator + {} producers", self.producers.len());
        println!("   ├─ Records: {}", self.total_recorded());
        println!("   ├─ Records/s: {:.2}", self.throughput());
        println!(
            "   └─ Flushes: {} threshold, {} forced",
            flushes.threshold_flushes, flushes.forced_flushes
        );

        println!("\n📦 Batches");
        println!("   ├─ Size: {}", flushes.summary());
        println!("   ├─ Relayed: {}", self.delivery.delivered);
        println!("   ├─ Unroutable: {}", self.delivery.unroutable);
        println!(
            "   ├─ Undecodable: {}",
            self.coordinator.dispatch.decode_failures
        );
        println!("   └─ Lost on send: {}", self.lost_batches());

        println!("\n🖥  Processes");
        for report in self.reports() {
            println!("   ├─ {report}");
        }

        match self.sink.kind {
            SinkKind::Csv => println!("\n📤 Sink: {}", self.sink.path.display()),
            SinkKind::Log => println!("\n📤 Sink: log only, nothing persisted"),
        }

        println!();
    }
}
