//! # Integration Tests
//!
//! Cross-crate end-to-end scenarios.
//!
//! Covers:
//! - Contract snapshots (sink header, config defaults)
//! - Producer and coordinator runs over the in-process control channel
//! - No loss / no duplication across many producers

#[cfg(test)]
mod contract_tests {
    use contracts::{TelemetryConfig, WireFormat, CSV_HEADERS, SEND_EVENTS_TOPIC};

    #[test]
    fn test_sink_header_snapshot() {
        assert_eq!(
            CSV_HEADERS.join(","),
            "endpoint,status_code,request_start_ms,response_duration_ms,error_type,error_message"
        );
        assert_eq!(dispatcher::header_line(), CSV_HEADERS.join(","));
    }

    #[test]
    fn test_empty_config_file_uses_defaults() {
        let config =
            config_loader::ConfigLoader::load_from_str("", config_loader::ConfigFormat::Toml)
                .unwrap();
        let defaults = TelemetryConfig::default();
        assert_eq!(config.batch_threshold, 5);
        assert_eq!(config.topic, SEND_EVENTS_TOPIC);
        assert_eq!(config.wire_format, WireFormat::Bincode);
        assert_eq!(config.sink.path, defaults.sink.path);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use bytes::Bytes;
    use contracts::{
        ControlChannel, EventRecord, RequestFailure, Role, SinkSettings, StaticTopology,
        TelemetryConfig, WireFormat, SEND_EVENTS_TOPIC,
    };
    use dispatcher::{format_record, header_line, LocalControlChannel};
    use ingestion::{MockRequestConfig, MockRequestSource, RequestOutcome};
    use lifecycle::{LifecycleState, ProcessTelemetry, RunReport};

    fn config_for(path: &Path, format: WireFormat) -> TelemetryConfig {
        TelemetryConfig {
            wire_format: format,
            sink: SinkSettings {
                path: path.to_path_buf(),
                ..SinkSettings::default()
            },
            ..TelemetryConfig::default()
        }
    }

    fn sink_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn start_coordinator(
        config: &TelemetryConfig,
        channel: &LocalControlChannel,
    ) -> ProcessTelemetry {
        let mut coordinator = ProcessTelemetry::new(config.clone());
        let role = coordinator
            .on_init(
                &StaticTopology::coordinator("master"),
                Arc::new(channel.endpoint("master")),
            )
            .unwrap();
        assert_eq!(role, Role::Coordinator);
        coordinator
    }

    fn start_producer(
        config: &TelemetryConfig,
        channel: &LocalControlChannel,
        node_id: &str,
    ) -> ProcessTelemetry {
        let mut producer = ProcessTelemetry::new(config.clone());
        let role = producer
            .on_init(
                &StaticTopology::producer(node_id),
                Arc::new(channel.endpoint(node_id)),
            )
            .unwrap();
        assert_eq!(role, Role::Producer);
        producer
    }

    fn stop(process: &mut ProcessTelemetry) -> RunReport {
        let report = process.on_test_stop().unwrap();
        process.terminate().unwrap();
        assert_eq!(process.state(), LifecycleState::Terminated);
        report
    }

    /// One producer records 10 successes then 2 HTTP 500 failures
    #[tokio::test]
    async fn test_producer_relays_threshold_and_forced_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let config = config_for(&path, WireFormat::Bincode);
        let channel = LocalControlChannel::spawn();

        let mut coordinator = start_coordinator(&config, &channel);
        let mut producer = start_producer(&config, &channel, "worker-1");

        for i in 0..12 {
            let outcome = if i < 10 {
                RequestOutcome::new("/", Some(200), 1_000 + i, 12.5, None)
            } else {
                let failure = RequestFailure::new(
                    "HTTPError",
                    "500 Server Error: Internal Server Error for url: /",
                );
                RequestOutcome::new("/", Some(500), 1_000 + i, 3.0, Some(failure))
            };
            producer.on_request(outcome).unwrap();
        }

        let report = stop(&mut producer);
        assert_eq!(report.batcher.threshold_flushes, 2);
        assert_eq!(report.batcher.forced_flushes, 1);
        assert_eq!(report.batcher.flushed_records, 12);
        assert_eq!(report.dispatch.sent, 3);
        assert_eq!(report.dispatch.written_local, 0);

        let delivery = channel.close().await.unwrap();
        assert_eq!(delivery.delivered, 3);

        let coordinator_report = stop(&mut coordinator);
        assert_eq!(coordinator_report.dispatch.received_remote, 3);
        assert_eq!(coordinator_report.dispatch.written_local, 0);

        let lines = sink_lines(&path);
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], header_line());
        for line in &lines[1..11] {
            assert!(line.ends_with(",,"), "unexpected error cells: {line}");
        }
        for line in &lines[11..] {
            let error_type = line.split(',').nth(4).unwrap();
            assert_eq!(error_type, "HTTPError");
        }
    }

    /// The coordinator alone records 3 events
    #[tokio::test]
    async fn test_coordinator_writes_residual_batch_locally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let config = config_for(&path, WireFormat::Bincode);
        let channel = LocalControlChannel::spawn();

        let mut coordinator = start_coordinator(&config, &channel);
        for i in 0..3 {
            coordinator
                .on_request(RequestOutcome::new("/", Some(200), i, 8.0, None))
                .unwrap();
        }
        // Header only until test stop
        assert_eq!(sink_lines(&path).len(), 1);

        let report = stop(&mut coordinator);
        assert_eq!(report.batcher.threshold_flushes, 0);
        assert_eq!(report.batcher.forced_flushes, 1);
        assert_eq!(report.dispatch.written_local, 1);
        assert_eq!(report.dispatch.sent, 0);

        let delivery = channel.close().await.unwrap();
        assert_eq!(delivery.delivered, 0);

        let lines = sink_lines(&path);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], header_line());
    }

    /// Every recorded event appears in the sink exactly once
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_producers_no_loss_no_duplication() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("events.csv");
        let config = config_for(&path, WireFormat::Json);
        let channel = LocalControlChannel::spawn();

        let mut coordinator = start_coordinator(&config, &channel);

        let counts = [0usize, 1, 4, 5, 13, 27];
        let mut handles = Vec::new();
        for (index, count) in counts.iter().copied().enumerate() {
            let node_id = format!("worker-{index}");
            let mut producer = start_producer(&config, &channel, &node_id);
            let source = MockRequestSource::new(MockRequestConfig {
                endpoints: vec![format!("/w{index}/a"), format!("/w{index}/b")],
                failure_every: Some(4),
                unreachable_every: Some(9),
                start_ms: Some(1_700_000_000_000),
                ..Default::default()
            });
            handles.push(tokio::spawn(async move {
                let mut expected = Vec::new();
                for outcome in source.take(count) {
                    expected.push(format_record(&EventRecord::from(outcome.clone())));
                    producer.on_request(outcome).unwrap();
                    tokio::task::yield_now().await;
                }
                let report = stop(&mut producer);
                (expected, report)
            }));
        }

        // Coordinator traffic interleaves with relayed batches
        let mut expected = Vec::new();
        for i in 0..11 {
            let outcome = RequestOutcome::new("/coordinator", Some(204), i, 1.0, None);
            expected.push(format_record(&EventRecord::from(outcome.clone())));
            coordinator.on_request(outcome).unwrap();
            tokio::task::yield_now().await;
        }

        for handle in handles {
            let (lines, report) = handle.await.unwrap();
            assert_eq!(report.batcher.recorded as usize, lines.len());
            assert_eq!(report.dispatch.send_failures, 0);
            expected.extend(lines);
        }

        channel.close().await.unwrap();
        stop(&mut coordinator);

        let mut written = sink_lines(&path);
        assert_eq!(written.remove(0), header_line());
        assert!(!written.contains(&header_line()));

        expected.sort();
        written.sort();
        assert_eq!(written.len(), counts.iter().sum::<usize>() + 11);
        assert_eq!(written, expected);
    }

    /// A producer never writes; its records only reach the sink via the channel
    #[tokio::test]
    async fn test_producer_without_coordinator_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("events.csv");
        let config = config_for(&path, WireFormat::Bincode);
        let channel = LocalControlChannel::spawn();

        let mut producer = start_producer(&config, &channel, "worker-1");
        for i in 0..6 {
            producer
                .on_request(RequestOutcome::new("/", Some(200), i, 1.0, None))
                .unwrap();
        }
        let report = stop(&mut producer);
        assert_eq!(report.role, Role::Producer);
        assert_eq!(report.dispatch.sent, 2);

        let delivery = channel.close().await.unwrap();
        assert_eq!(delivery.unroutable, 2);
        assert!(!path.exists());
    }

    /// A payload that does not decode is dropped; relay keeps going
    #[tokio::test]
    async fn test_undecodable_payload_does_not_stop_relay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let config = config_for(&path, WireFormat::Bincode);
        let channel = LocalControlChannel::spawn();

        let mut coordinator = start_coordinator(&config, &channel);
        channel
            .endpoint("rogue")
            .send(SEND_EVENTS_TOPIC, Bytes::from_static(&[0xff, 0xff, 0xff]))
            .unwrap();

        let mut producer = start_producer(&config, &channel, "worker-1");
        for i in 0..10 {
            producer
                .on_request(RequestOutcome::new("/", Some(200), i, 2.0, None))
                .unwrap();
        }
        stop(&mut producer);

        let delivery = channel.close().await.unwrap();
        assert_eq!(delivery.delivered, 3);

        let report = stop(&mut coordinator);
        assert_eq!(report.dispatch.decode_failures, 1);
        assert_eq!(report.dispatch.received_remote, 2);
        assert_eq!(sink_lines(&path).len(), 11);
    }

    /// Records the producer sends after the channel closes are lost but counted
    #[tokio::test]
    async fn test_send_after_close_is_counted_as_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let config = config_for(&path, WireFormat::Bincode);
        let channel = LocalControlChannel::spawn();

        let mut coordinator = start_coordinator(&config, &channel);
        let mut producer = start_producer(&config, &channel, "worker-1");
        channel.close().await.unwrap();

        for i in 0..5 {
            producer
                .on_request(RequestOutcome::new("/", Some(200), i, 1.0, None))
                .unwrap();
        }
        let report = stop(&mut producer);
        assert_eq!(report.dispatch.send_failures, 1);
        assert_eq!(report.dispatch.sent, 0);

        stop(&mut coordinator);
        assert_eq!(sink_lines(&path).len(), 1);
    }
}
