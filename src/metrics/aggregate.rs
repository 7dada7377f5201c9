//! Aggregate results across all clients of a run

use crate::metrics::client::RunResults;
use crate::metrics::stats;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fleet-wide results of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalResults {
    pub ratio: Option<f64>,
    pub successes: u64,
    pub failures: u64,
    pub total: u64,
    pub total_run_time: f64,
    pub avg_run_time: f64,
    pub msg_time_min: Option<f64>,
    pub msg_time_max: Option<f64>,
    pub msg_time_mean_avg: Option<f64>,
    pub msg_time_mean_std: Option<f64>,
    pub total_msgs_per_sec: f64,
    pub avg_msgs_per_sec: f64,
}

/// Reduce per-client results into run totals.
///
/// Latency extrema only consider clients with at least one successful
/// publish. The averages are taken over one slot per client, where a client
/// without successes contributes `0.0` for its mean latency, throughput and
/// run time. `msg_time_mean_avg`/`msg_time_mean_std` are the mean and sample
/// standard deviation of the per-client means, not of the raw samples.
pub fn calculate_total_results(results: &[RunResults], total_run_time: Duration) -> TotalResults {
    let mut totals = TotalResults {
        total_run_time: total_run_time.as_secs_f64(),
        ..Default::default()
    };

    let mut msg_time_means = Vec::with_capacity(results.len());
    let mut msgs_per_secs = Vec::with_capacity(results.len());
    let mut run_times = Vec::with_capacity(results.len());

    for res in results {
        totals.successes += res.successes;
        totals.failures += res.failures;
        totals.total += res.total;
        totals.total_msgs_per_sec += res.msgs_per_sec;

        if res.is_failed() {
            msg_time_means.push(0.0);
            msgs_per_secs.push(0.0);
            run_times.push(0.0);
            continue;
        }

        if let Some(min) = res.msg_time_min {
            totals.msg_time_min = Some(totals.msg_time_min.map_or(min, |cur| cur.min(min)));
        }
        if let Some(max) = res.msg_time_max {
            totals.msg_time_max = Some(totals.msg_time_max.map_or(max, |cur| cur.max(max)));
        }

        msg_time_means.push(res.msg_time_mean.unwrap_or(0.0));
        msgs_per_secs.push(res.msgs_per_sec);
        run_times.push(res.run_time);
    }

    if totals.total > 0 {
        totals.ratio = Some(totals.successes as f64 / totals.total as f64);
    }
    totals.avg_msgs_per_sec = stats::mean(&msgs_per_secs).unwrap_or(0.0);
    totals.avg_run_time = stats::mean(&run_times).unwrap_or(0.0);
    totals.msg_time_mean_avg = stats::mean(&msg_time_means);
    totals.msg_time_mean_std = stats::sample_std_dev(&msg_time_means);

    totals
}
