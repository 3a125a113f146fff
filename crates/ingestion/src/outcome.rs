//! Request outcome - recording entry point input
//!
//! What the request-execution layer reports after every request.

use chrono::Utc;
use contracts::{EventRecord, RequestFailure};

/// Outcome reported by the request layer
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    /// Endpoint name (e.g. `/` or a logical request name)
    pub endpoint: String,
    /// HTTP status, `None` if no response was received
    pub status_code: Option<u16>,
    /// Request start, epoch milliseconds
    pub start_ms: i64,
    /// Response time in milliseconds
    pub duration_ms: f64,
    /// Failure raised by the request, if any
    pub failure: Option<RequestFailure>,
}

impl RequestOutcome {
    pub fn new(
        endpoint: impl Into<String>,
        status_code: Option<u16>,
        start_ms: i64,
        duration_ms: f64,
        failure: Option<RequestFailure>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            status_code,
            start_ms,
            duration_ms,
            failure,
        }
    }

    /// Outcome of a request that started now
    pub fn started_now(
        endpoint: impl Into<String>,
        status_code: Option<u16>,
        duration_ms: f64,
        failure: Option<RequestFailure>,
    ) -> Self {
        Self::new(endpoint, status_code, now_ms(), duration_ms, failure)
    }

    /// Convert into the immutable record
    pub fn into_record(self) -> EventRecord {
        EventRecord::new(
            self.endpoint,
            self.status_code,
            self.start_ms,
            self.duration_ms,
        )
        .with_failure(self.failure)
    }
}

impl From<RequestOutcome> for EventRecord {
    fn from(outcome: RequestOutcome) -> Self {
        outcome.into_record()
    }
}

/// Current wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
