//! Layered error definitions
//!
//! Categorized by source: config / sink / channel / codec

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink open error
    #[error("sink '{sink_name}' open error: {message}")]
    SinkOpen { sink_name: String, message: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink used before `init` or initialized twice
    #[error("sink '{sink_name}' lifecycle error: {message}")]
    SinkState { sink_name: String, message: String },

    // ===== Channel Errors =====
    /// Control channel send error
    #[error("control channel send error on topic '{topic}': {message}")]
    ChannelSend { topic: String, message: String },

    /// Handler registration error
    #[error("control channel handler error on topic '{topic}': {message}")]
    ChannelHandler { topic: String, message: String },

    // ===== Codec Errors =====
    /// Batch payload could not be encoded/decoded
    #[error("codec error: {message}")]
    Codec { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink open error
    pub fn sink_open(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkOpen {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink lifecycle error
    pub fn sink_state(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkState {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create channel send error
    pub fn channel_send(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelSend {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create handler registration error
    pub fn channel_handler(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelHandler {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Whether the error comes from the sink (fatal on the coordinator)
    pub fn is_sink_failure(&self) -> bool {
        matches!(
            self,
            Self::SinkOpen { .. } | Self::SinkWrite { .. } | Self::SinkState { .. } | Self::Io(_)
        )
    }
}
