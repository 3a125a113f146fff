//! Mock request source
//!
//! Deterministic request outcomes for runs without a target service.

use contracts::RequestFailure;

use crate::outcome::{now_ms, RequestOutcome};

/// Mock request source configuration
#[derive(Debug, Clone)]
pub struct MockRequestConfig {
    /// Endpoints, used round-robin
    pub endpoints: Vec<String>,

    /// Every n-th request fails with `500 / HTTPError` (None = never)
    pub failure_every: Option<u64>,

    /// Every n-th request gets no response (None = never)
    pub unreachable_every: Option<u64>,

    /// Nominal response time (ms)
    pub base_latency_ms: f64,

    /// Spacing between request starts (ms)
    pub interval_ms: i64,

    /// First request start; defaults to now
    pub start_ms: Option<i64>,
}

impl Default for MockRequestConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["/".to_string()],
            failure_every: None,
            unreachable_every: None,
            base_latency_ms: 20.0,
            interval_ms: 1000,
            start_ms: None,
        }
    }
}

/// Infinite iterator of mock request outcomes
#[derive(Debug, Clone)]
pub struct MockRequestSource {
    config: MockRequestConfig,
    start_ms: i64,
    issued: u64,
}

impl MockRequestSource {
    pub fn new(config: MockRequestConfig) -> Self {
        let start_ms = config.start_ms.unwrap_or_else(now_ms);
        Self {
            config,
            start_ms,
            issued: 0,
        }
    }

    /// Single-endpoint source failing every `failure_every` requests
    pub fn failing_every(endpoint: &str, failure_every: u64) -> Self {
        Self::new(MockRequestConfig {
            endpoints: vec![endpoint.to_string()],
            failure_every: Some(failure_every),
            ..Default::default()
        })
    }

    /// Requests issued so far
    pub fn issued(&self) -> u64 {
        self.issued
    }

    fn endpoint(&self, index: u64) -> String {
        if self.config.endpoints.is_empty() {
            return "/".to_string();
        }
        let idx = (index % self.config.endpoints.len() as u64) as usize;
        self.config.endpoints[idx].clone()
    }

    fn build(&self, index: u64) -> RequestOutcome {
        let n = index + 1;
        let endpoint = self.endpoint(index);
        let start_ms = self.start_ms + index as i64 * self.config.interval_ms;
        let latency = self.config.base_latency_ms + (index % 7) as f64 * 1.5;

        if hits(self.config.unreachable_every, n) {
            let failure = RequestFailure::new("ConnectionRefusedError", "connection refused");
            return RequestOutcome::new(endpoint, None, start_ms, 0.0, Some(failure));
        }

        if hits(self.config.failure_every, n) {
            let message = format!("500 Server Error: Internal Server Error for url: {endpoint}");
            let failure = RequestFailure::new("HTTPError", message);
            return RequestOutcome::new(endpoint, Some(500), start_ms, latency, Some(failure));
        }

        RequestOutcome::new(endpoint, Some(200), start_ms, latency, None)
    }
}

fn hits(every: Option<u64>, n: u64) -> bool {
    matches!(every, Some(k) if k > 0 && n % k == 0)
}

impl Iterator for MockRequestSource {
    type Item = RequestOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let outcome = self.build(self.issued);
        self.issued += 1;
        Some(outcome)
    }
}
