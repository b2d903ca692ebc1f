//! Aggregation of per-session latency samples into a run summary

use crate::models::SessionResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for statistical calculations
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Percentiles to calculate (e.g., 50th, 90th, 99th)
    pub percentiles: Vec<f64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            percentiles: vec![50.0, 90.0, 99.0],
        }
    }
}

/// Population-wide summary of one load-test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Clients that were spawned
    pub players: usize,
    /// Sessions that measured their full window
    pub completed_sessions: usize,
    /// Sessions that failed to connect or ended early
    pub failed_sessions: usize,
    /// Latency samples across all sessions
    pub total_inputs: usize,
    /// Sum of all latency samples, seconds
    pub total_latency_secs: f64,
    /// `None` when no message arrived anywhere
    pub mean_latency_ms: Option<f64>,
    /// Spread of the samples; absent without data
    pub distribution: Option<LatencyDistribution>,
    /// Wall-clock time of the whole run, seconds
    pub elapsed_secs: f64,
}

/// Spread of latency samples, milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
    /// Keyed as "p50", "p90", ...
    pub percentiles: BTreeMap<String, f64>,
}

impl RunSummary {
    /// Summarize with the default percentile set
    pub fn from_results(results: &[SessionResult], elapsed: Duration) -> Self {
        Aggregator::default().summarize(results, elapsed)
    }

    /// Whether at least one sample was collected
    pub fn has_data(&self) -> bool {
        self.mean_latency_ms.is_some()
    }

    /// Mean latency rounded to 3 decimals for reporting
    pub fn mean_latency_ms_rounded(&self) -> Option<f64> {
        self.mean_latency_ms.map(|ms| round_to(ms, 3))
    }

    /// Elapsed time rounded to 2 decimals for reporting
    pub fn elapsed_secs_rounded(&self) -> f64 {
        round_to(self.elapsed_secs, 2)
    }

    /// Matches represented by the spawned players
    pub fn matches(&self) -> usize {
        self.players / 2
    }
}

/// Reduces session results into a [`RunSummary`]
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, results: &[SessionResult], elapsed: Duration) -> RunSummary {
        let mut total_latency = 0.0;
        let mut total_inputs = 0usize;
        for result in results {
            for latency in &result.latencies {
                total_latency += latency;
                total_inputs += 1;
            }
        }

        let completed_sessions = results.iter().filter(|r| r.is_completed()).count();

        RunSummary {
            players: results.len(),
            completed_sessions,
            failed_sessions: results.len() - completed_sessions,
            total_inputs,
            total_latency_secs: total_latency,
            mean_latency_ms: mean_latency_ms(total_latency, total_inputs),
            distribution: self.distribution(results),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    fn distribution(&self, results: &[SessionResult]) -> Option<LatencyDistribution> {
        let mut samples_ms: Vec<f64> = results
            .iter()
            .flat_map(|r| r.latencies.iter().map(|s| s * 1000.0))
            .collect();
        if samples_ms.is_empty() {
            return None;
        }
        samples_ms.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = samples_ms.len() as f64;
        let mean = samples_ms.iter().sum::<f64>() / count;
        let variance = samples_ms.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

        let percentiles = self
            .config
            .percentiles
            .iter()
            .map(|&p| (format!("p{:.0}", p), calculate_percentile(&samples_ms, p)))
            .collect();

        Some(LatencyDistribution {
            min_ms: samples_ms[0],
            max_ms: samples_ms[samples_ms.len() - 1],
            std_dev_ms: variance.sqrt(),
            percentiles,
        })
    }
}

/// Mean of `total_inputs` samples summing to `total_latency` seconds, in ms.
/// `None` for zero samples instead of dividing by zero.
pub fn mean_latency_ms(total_latency: f64, total_inputs: usize) -> Option<f64> {
    if total_inputs == 0 {
        None
    } else {
        Some(total_latency * 1000.0 / total_inputs as f64)
    }
}

/// Linear interpolation between closest ranks over sorted values
fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
