//! Individual client metrics collection

use crate::common::ClientId;
use crate::metrics::stats;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Results of a single client run
///
/// Latency values are milliseconds over successful publishes only and are
/// `None` when the client has no successful publish. `run_time` is seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub id: ClientId,
    pub successes: u64,
    pub failures: u64,
    pub total: u64,
    pub run_time: f64,
    pub msg_time_min: Option<f64>,
    pub msg_time_max: Option<f64>,
    pub msg_time_mean: Option<f64>,
    pub msg_time_std: Option<f64>,
    pub msgs_per_sec: f64,
}

impl RunResults {
    /// Result of a client that could not connect and made no attempts
    pub fn failed_client(client_id: ClientId, run_time: Duration) -> Self {
        ClientMetrics::new(client_id).into_results(run_time)
    }

    /// A client without a single successful publish
    #[inline]
    pub fn is_failed(&self) -> bool {
        self.successes == 0
    }
}

/// Timing samples and counters accumulated by one worker
#[derive(Debug, Clone, Default)]
pub struct ClientMetrics {
    pub client_id: ClientId,
    pub successes: u64,
    pub failures: u64,
    samples_ms: Vec<f64>,
}

impl ClientMetrics {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            ..Default::default()
        }
    }

    /// Record an acknowledged publish and its latency
    pub fn record_success(&mut self, latency: Duration) {
        self.successes += 1;
        self.samples_ms.push(latency.as_nanos() as f64 / 1_000_000.0);
    }

    /// Record a publish that errored or timed out
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Total publish attempts so far
    pub fn total_attempted(&self) -> u64 {
        self.successes + self.failures
    }

    /// Reduce the samples into the client's final results
    pub fn into_results(self, run_time: Duration) -> RunResults {
        let run_time_secs = run_time.as_secs_f64();
        let msgs_per_sec = if self.successes > 0 && run_time_secs > 0.0 {
            self.successes as f64 / run_time_secs
        } else {
            0.0
        };

        RunResults {
            id: self.client_id,
            successes: self.successes,
            failures: self.failures,
            total: self.total_attempted(),
            run_time: run_time_secs,
            msg_time_min: stats::min(&self.samples_ms),
            msg_time_max: stats::max(&self.samples_ms),
            msg_time_mean: stats::mean(&self.samples_ms),
            msg_time_std: stats::sample_std_dev(&self.samples_ms),
            msgs_per_sec,
        }
    }
}
