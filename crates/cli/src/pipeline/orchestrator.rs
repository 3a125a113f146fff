//! Simulation orchestrator - one coordinator and N producers in-process.
//!
//! Every simulated process gets its own `ProcessTelemetry` and a
//! sender-stamped endpoint on a shared `LocalControlChannel`. Producers
//! run as tokio tasks; the coordinator records on the calling task while
//! relayed batches arrive on the channel's delivery task.
//!
//! Stop order: producers test-stop, then the channel is drained, then the
//! coordinator test-stops. Nothing relayed is left behind.

use std::sync::Arc;
use std::time::Instant;

use contracts::{NodeId, StaticTopology, TelemetryConfig};
use dispatcher::LocalControlChannel;
use ingestion::{MockRequestConfig, MockRequestSource};
use lifecycle::{LifecycleError, ProcessTelemetry, RunReport};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::RunStats;
use crate::error::{CliError, Result};

type ProducerHandle = JoinHandle<std::result::Result<RunReport, LifecycleError>>;

/// Coordinator node id
pub const COORDINATOR_ID: &str = "master";

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Telemetry settings shared by every process
    pub telemetry: TelemetryConfig,

    /// Number of producer processes
    pub workers: usize,

    /// Requests issued by each producer
    pub requests_per_worker: u64,

    /// Requests issued by the coordinator
    pub coordinator_requests: u64,

    /// Every n-th mock request fails (None = never)
    pub failure_every: Option<u64>,

    /// Mock endpoints, used round-robin
    pub endpoints: Vec<String>,
}

impl SimulationConfig {
    pub fn new(telemetry: TelemetryConfig) -> Self {
        Self {
            telemetry,
            workers: 4,
            requests_per_worker: 12,
            coordinator_requests: 3,
            failure_every: None,
            endpoints: vec!["/".to_string()],
        }
    }
}

/// In-process distributed run
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Run every process to termination
    #[instrument(
        name = "simulation_run",
        skip(self),
        fields(workers = self.config.workers, threshold = self.config.telemetry.batch_threshold)
    )]
    pub async fn run(self) -> Result<RunStats> {
        self.run_with(LocalControlChannel::spawn()).await
    }

    async fn run_with(self, channel: LocalControlChannel) -> Result<RunStats> {
        let result = self.run_on(&channel).await;
        if result.is_err() {
            // Endpoints may outlive the run; refuse their sends from here on
            if let Err(e) = channel.close().await {
                warn!(error = %e, "Control channel close after failed run");
            }
        }
        result
    }

    async fn run_on(&self, channel: &LocalControlChannel) -> Result<RunStats> {
        let start_time = Instant::now();

        // Coordinator first: the sink and inbound handler must exist
        // before any producer flushes.
        let mut coordinator = ProcessTelemetry::new(self.config.telemetry.clone());
        coordinator
            .on_init(
                &StaticTopology::coordinator(COORDINATOR_ID),
                Arc::new(channel.endpoint(COORDINATOR_ID)),
            )
            .map_err(|e| CliError::process(COORDINATOR_ID, e))?;

        let producers = self.spawn_producers(channel)?;
        info!(producers = producers.len(), "Producers started");

        let source = self.request_source(0);
        for outcome in source.take(self.config.coordinator_requests as usize) {
            coordinator
                .on_request(outcome)
                .map_err(|e| CliError::process(COORDINATOR_ID, e))?;
            tokio::task::yield_now().await;
        }

        let mut producer_reports = Vec::with_capacity(producers.len());
        for (node, handle) in producers {
            let report = handle
                .await
                .map_err(|e| CliError::join(node.clone(), e.to_string()))?
                .map_err(|e| CliError::process(node, e))?;
            producer_reports.push(report);
        }
        info!("All producers stopped, draining control channel");

        let delivery = channel.close().await.map_err(CliError::Delivery)?;
        debug!(
            delivered = delivery.delivered,
            unroutable = delivery.unroutable,
            "Control channel drained"
        );

        let coordinator_report = coordinator
            .on_test_stop()
            .map_err(|e| CliError::process(COORDINATOR_ID, e))?;
        coordinator
            .terminate()
            .map_err(|e| CliError::process(COORDINATOR_ID, e))?;

        let stats = RunStats {
            coordinator: coordinator_report,
            producers: producer_reports,
            delivery,
            sink: self.config.telemetry.sink.clone(),
            duration: start_time.elapsed(),
        };
        info!(
            recorded = stats.total_recorded(),
            duration_secs = stats.duration.as_secs_f64(),
            "Simulation complete"
        );
        Ok(stats)
    }

    fn spawn_producers(
        &self,
        channel: &LocalControlChannel,
    ) -> Result<Vec<(NodeId, ProducerHandle)>> {
        let mut handles = Vec::with_capacity(self.config.workers);

        for index in 1..=self.config.workers {
            let node_id = format!("worker-{index}");
            let mut process = ProcessTelemetry::new(self.config.telemetry.clone());
            process
                .on_init(
                    &StaticTopology::producer(node_id.clone()),
                    Arc::new(channel.endpoint(node_id.clone())),
                )
                .map_err(|e| CliError::process(node_id.clone(), e))?;

            let source = self.request_source(index as u64);
            let requests = self.config.requests_per_worker;
            let handle = tokio::spawn(async move {
                for outcome in source.take(requests as usize) {
                    process.on_request(outcome)?;
                    tokio::task::yield_now().await;
                }
                let report = process.on_test_stop()?;
                process.terminate()?;
                Ok::<_, LifecycleError>(report)
            });
            handles.push((node_id, handle));
        }

        Ok(handles)
    }

    /// Mock source for one process; start times are staggered per process
    fn request_source(&self, index: u64) -> MockRequestSource {
        MockRequestSource::new(MockRequestConfig {
            endpoints: self.config.endpoints.clone(),
            failure_every: self.config.failure_every,
            interval_ms: 250,
            start_ms: Some(ingestion::now_ms() + index as i64 * 7),
            ..Default::default()
        })
    }
}
