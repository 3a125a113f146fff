//! ProcessTelemetry - binds harness lifecycle events to the pipeline

use std::fmt;
use std::sync::Arc;

use contracts::{ControlChannel, NodeId, Role, TelemetryConfig, Topology};
use dispatcher::{create_sink, DispatchSnapshot, Dispatcher};
use ingestion::{Batcher, BatcherStats, RequestOutcome};
use observability::FlushStatsAggregator;
use tracing::{debug, info, instrument};

use crate::error::LifecycleError;
use crate::state::LifecycleState;

/// End-of-test summary for one process
#[derive(Debug, Clone)]
pub struct RunReport {
    pub node_id: NodeId,
    pub role: Role,
    pub batcher: BatcherStats,
    pub dispatch: DispatchSnapshot,
    pub flushes: FlushStatsAggregator,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): recorded={}, flushes={}+{}, batch_size[{}], sent={}, send_failures={}, written_local={}, received_remote={}, decode_failures={}",
            self.node_id,
            self.role,
            self.batcher.recorded,
            self.batcher.threshold_flushes,
            self.batcher.forced_flushes,
            self.flushes.summary(),
            self.dispatch.sent,
            self.dispatch.send_failures,
            self.dispatch.written_local,
            self.dispatch.received_remote,
            self.dispatch.decode_failures,
        )
    }
}

struct Wiring {
    node_id: NodeId,
    role: Role,
    batcher: Batcher<Dispatcher>,
}

/// Telemetry state for one process
///
/// Owns the Batcher and Dispatcher once initialized. There is no shared
/// buffer between processes or instances.
pub struct ProcessTelemetry {
    config: TelemetryConfig,
    state: LifecycleState,
    wiring: Option<Wiring>,
}

impl ProcessTelemetry {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            wiring: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Resolved role, `None` before `on_init`
    pub fn role(&self) -> Option<Role> {
        self.wiring.as_ref().map(|w| w.role)
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Records buffered and not yet flushed
    pub fn buffered(&self) -> usize {
        self.wiring.as_ref().map_or(0, |w| w.batcher.buffered())
    }

    /// Resolve the role and wire the pipeline
    ///
    /// On the coordinator this opens the sink, writes the header and
    /// registers the inbound handler on `channel`.
    ///
    /// # Errors
    /// `InvalidTransition` unless uninitialized; sink open failures.
    #[instrument(
        name = "lifecycle_on_init",
        skip(self, topology, channel),
        fields(node = %topology.node_id())
    )]
    pub fn on_init(
        &mut self,
        topology: &dyn Topology,
        channel: Arc<dyn ControlChannel>,
    ) -> Result<Role, LifecycleError> {
        self.expect_state(LifecycleState::Uninitialized, "init")?;

        let node_id = topology.node_id().to_string();
        let role = Role::from_topology(topology);
        let format = self.config.wire_format;

        let dispatcher = match role {
            Role::Coordinator => {
                let sink = create_sink(&self.config.sink);
                sink.init()?;
                let dispatcher = Dispatcher::coordinator(node_id.clone(), sink, format);
                dispatcher.register_inbound(channel.as_ref(), &self.config.topic)?;
                dispatcher
            }
            Role::Producer => {
                Dispatcher::producer(node_id.clone(), channel, self.config.topic.clone(), format)
            }
        };

        let batcher = Batcher::new(node_id.clone(), self.config.batch_threshold, dispatcher);
        info!(
            node = %node_id,
            role = %role,
            threshold = batcher.threshold(),
            topic = %self.config.topic,
            "Telemetry initialized"
        );

        self.wiring = Some(Wiring {
            node_id,
            role,
            batcher,
        });
        self.state = LifecycleState::Active;
        Ok(role)
    }

    /// Record one request outcome
    ///
    /// # Errors
    /// `InvalidTransition` unless active; on the coordinator, sink
    /// failures from a threshold flush.
    pub fn on_request(&mut self, outcome: RequestOutcome) -> Result<(), LifecycleError> {
        self.expect_state(LifecycleState::Active, "request")?;
        let wiring = self.wiring_mut("request")?;
        wiring.batcher.record(outcome.into())?;
        Ok(())
    }

    /// Flush the residual buffer and report
    ///
    /// The state moves to draining even if the flush fails.
    #[instrument(name = "lifecycle_on_test_stop", skip(self))]
    pub fn on_test_stop(&mut self) -> Result<RunReport, LifecycleError> {
        self.expect_state(LifecycleState::Active, "test_stop")?;
        self.state = LifecycleState::Draining;

        let wiring = self.wiring_mut("test_stop")?;
        let flushed = wiring.batcher.force_flush()?;
        debug!(node = %wiring.node_id, flushed = ?flushed, "Residual buffer flushed");

        let report = RunReport {
            node_id: wiring.node_id.clone(),
            role: wiring.role,
            batcher: wiring.batcher.stats(),
            dispatch: wiring.batcher.outlet().metrics(),
            flushes: wiring.batcher.flush_stats().clone(),
        };
        info!(
            node = %report.node_id,
            role = %report.role,
            recorded = report.batcher.recorded,
            flushed = report.batcher.flushed_records,
            "Test stopped"
        );
        Ok(report)
    }

    /// Acknowledge process exit; the sink gets no footer
    pub fn terminate(&mut self) -> Result<(), LifecycleError> {
        self.expect_state(LifecycleState::Draining, "terminate")?;
        self.state = LifecycleState::Terminated;
        debug!("Telemetry terminated");
        Ok(())
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        event: &'static str,
    ) -> Result<(), LifecycleError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::invalid_transition(self.state, event))
        }
    }

    fn wiring_mut(&mut self, event: &'static str) -> Result<&mut Wiring, LifecycleError> {
        let state = self.state;
        self.wiring
            .as_mut()
            .ok_or_else(|| LifecycleError::invalid_transition(state, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkSettings, StaticTopology, CSV_HEADERS};
    use dispatcher::LocalControlChannel;
    use std::fs;
    use std::path::Path;

    fn config_with_sink(path: &Path) -> TelemetryConfig {
        TelemetryConfig {
            sink: SinkSettings {
                path: path.to_path_buf(),
                ..SinkSettings::default()
            },
            ..TelemetryConfig::default()
        }
    }

    fn ok(endpoint: &str, start_ms: i64) -> RequestOutcome {
        RequestOutcome::new(endpoint, Some(200), start_ms, 10.0, None)
    }

    #[tokio::test]
    async fn test_full_lifecycle_coordinator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let channel = LocalControlChannel::spawn();

        let mut process = ProcessTelemetry::new(config_with_sink(&path));
        assert_eq!(process.state(), LifecycleState::Uninitialized);
        assert_eq!(process.role(), None);

        let role = process
            .on_init(
                &StaticTopology::coordinator("master"),
                Arc::new(channel.endpoint("master")),
            )
            .unwrap();
        assert_eq!(role, Role::Coordinator);
        assert_eq!(process.state(), LifecycleState::Active);

        for i in 0..3 {
            process.on_request(ok("/", i)).unwrap();
        }
        assert_eq!(process.buffered(), 3);

        let report = process.on_test_stop().unwrap();
        assert_eq!(process.state(), LifecycleState::Draining);
        assert_eq!(report.batcher.forced_flushes, 1);
        assert_eq!(report.dispatch.written_local, 1);

        process.terminate().unwrap();
        assert_eq!(process.state(), LifecycleState::Terminated);
        channel.close().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
    }

    #[tokio::test]
    async fn test_producer_does_not_touch_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let channel = LocalControlChannel::spawn();

        let mut process = ProcessTelemetry::new(config_with_sink(&path));
        let role = process
            .on_init(
                &StaticTopology::producer("worker-1"),
                Arc::new(channel.endpoint("worker-1")),
            )
            .unwrap();
        assert_eq!(role, Role::Producer);

        for i in 0..7 {
            process.on_request(ok("/", i)).unwrap();
        }
        let report = process.on_test_stop().unwrap();
        assert_eq!(report.batcher.threshold_flushes, 1);
        assert_eq!(report.batcher.forced_flushes, 1);
        assert_eq!(report.dispatch.sent, 2);
        assert_eq!(report.dispatch.written_local, 0);

        // No coordinator registered: both messages are unroutable
        let stats = channel.close().await.unwrap();
        assert_eq!(stats.unroutable, 2);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let channel = LocalControlChannel::spawn();
        let mut process = ProcessTelemetry::new(TelemetryConfig::default());

        let err = process.on_request(ok("/", 0)).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: LifecycleState::Uninitialized,
                event: "request"
            }
        ));
        assert!(process.on_test_stop().is_err());
        assert!(process.terminate().is_err());

        process
            .on_init(
                &StaticTopology::producer("worker-1"),
                Arc::new(channel.endpoint("worker-1")),
            )
            .unwrap();
        assert!(process
            .on_init(
                &StaticTopology::producer("worker-1"),
                Arc::new(channel.endpoint("worker-1")),
            )
            .is_err());
        assert!(process.terminate().is_err());

        process.on_test_stop().unwrap();
        assert!(process.on_request(ok("/", 1)).is_err());
        assert!(process.on_test_stop().is_err());
        channel.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_coordinator_init_fails_on_bad_sink_path() {
        let dir = tempfile::tempdir().unwrap();
        let channel = LocalControlChannel::spawn();
        // A directory cannot be opened as the sink file
        let mut process = ProcessTelemetry::new(config_with_sink(dir.path()));

        let err = process
            .on_init(
                &StaticTopology::coordinator("master"),
                Arc::new(channel.endpoint("master")),
            )
            .unwrap_err();
        assert!(err.is_sink_failure());
        assert_eq!(process.state(), LifecycleState::Uninitialized);
        channel.close().await.unwrap();
    }
}
