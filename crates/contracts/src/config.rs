//! TelemetryConfig - Config Loader output
//!
//! Batching threshold, control topic, wire format and sink settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::SEND_EVENTS_TOPIC;

/// Default number of records that triggers an automatic flush
pub const DEFAULT_BATCH_THRESHOLD: usize = 5;

/// Complete telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelemetryConfig {
    /// Records buffered before a flush
    #[serde(default = "default_batch_threshold")]
    #[validate(range(min = 1, message = "batch_threshold must be >= 1"))]
    pub batch_threshold: usize,

    /// Control channel topic for event batches
    #[serde(default = "default_topic")]
    #[validate(length(min = 1, message = "topic cannot be empty"))]
    pub topic: String,

    /// Batch encoding on the control channel
    #[serde(default)]
    pub wire_format: WireFormat,

    /// Coordinator sink
    #[serde(default)]
    pub sink: SinkSettings,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            batch_threshold: default_batch_threshold(),
            topic: default_topic(),
            wire_format: WireFormat::default(),
            sink: SinkSettings::default(),
        }
    }
}

fn default_batch_threshold() -> usize {
    DEFAULT_BATCH_THRESHOLD
}

fn default_topic() -> String {
    SEND_EVENTS_TOPIC.to_string()
}

/// Serialization format for batches on the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Bincode (binary, compact)
    #[default]
    Bincode,
    /// JSON (human-readable, larger)
    Json,
}

/// Sink implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// CSV record log on disk
    #[default]
    Csv,
    /// Batch summaries via tracing, nothing on disk
    Log,
}

/// Sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSettings {
    /// Sink implementation
    #[serde(default)]
    pub kind: SinkKind,

    /// Output file (csv only)
    #[serde(default = "default_sink_path")]
    pub path: PathBuf,

    /// fsync after every append
    #[serde(default)]
    pub sync_data: bool,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            path: default_sink_path(),
            sync_data: false,
        }
    }
}

fn default_sink_path() -> PathBuf {
    PathBuf::from("events.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.batch_threshold, 5);
        assert_eq!(config.topic, "send_events");
        assert_eq!(config.wire_format, WireFormat::Bincode);
        assert_eq!(config.sink.kind, SinkKind::Csv);
        assert_eq!(config.sink.path, PathBuf::from("events.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: TelemetryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_threshold, DEFAULT_BATCH_THRESHOLD);
        assert_eq!(config.topic, SEND_EVENTS_TOPIC);
    }

    #[test]
    fn test_zero_threshold_fails_validation() {
        let config = TelemetryConfig {
            batch_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
