//! EventRecord - one request outcome
//!
//! Produced by the request-execution layer, consumed by the Batcher.

use serde::{Deserialize, Serialize};

/// Outcome of a single completed (or failed) request.
///
/// Immutable once built: fields are private and only readable through
/// accessors. Two records with identical fields are still two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    endpoint: String,
    status_code: Option<u16>,
    request_start_ms: i64,
    response_duration_ms: f64,
    error_kind: String,
    error_message: String,
}

impl EventRecord {
    /// Create a record without error information
    pub fn new(
        endpoint: impl Into<String>,
        status_code: Option<u16>,
        request_start_ms: i64,
        response_duration_ms: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            status_code,
            request_start_ms,
            response_duration_ms,
            error_kind: String::new(),
            error_message: String::new(),
        }
    }

    /// Attach the failure that ended this request
    pub fn with_error(mut self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_kind = kind.into();
        self.error_message = message.into();
        self
    }

    /// Attach an optional failure
    pub fn with_failure(self, failure: Option<RequestFailure>) -> Self {
        match failure {
            Some(f) => self.with_error(f.kind, f.message),
            None => self,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP status, `None` when no response was received
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Request start (epoch milliseconds)
    pub fn request_start_ms(&self) -> i64 {
        self.request_start_ms
    }

    pub fn response_duration_ms(&self) -> f64 {
        self.response_duration_ms
    }

    /// Failure kind, empty if the request succeeded
    pub fn error_kind(&self) -> &str {
        &self.error_kind
    }

    /// Failure message, empty if the request succeeded
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Whether this record carries a failure
    pub fn is_failure(&self) -> bool {
        !self.error_kind.is_empty() || !self.error_message.is_empty()
    }
}

/// Failure raised while executing a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailure {
    /// Failure type label (e.g. `HTTPError`, `ConnectionRefused`)
    pub kind: String,
    /// Human readable message
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Build from any error, labelled with the given kind
    pub fn from_error(kind: impl Into<String>, error: &dyn std::error::Error) -> Self {
        Self::new(kind, error.to_string())
    }
}
