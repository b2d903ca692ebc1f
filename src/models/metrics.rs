//! Per-session measurement data models

use crate::plan::MatchId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use chrono::{DateTime, Utc};

/// Terminal state of one connection session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The measurement window elapsed while the connection was healthy
    Completed,
    /// Connect failure, peer close or transport error before the deadline
    Failed { reason: String },
}

impl SessionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// The ordered inter-arrival samples gathered by one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Slot of this client in the spawn plan
    pub client_index: usize,

    /// Match this client joined
    pub match_id: MatchId,

    /// Endpoint the client connected to
    pub endpoint: String,

    /// Inter-arrival latencies in arrival order, seconds. Empty on failure.
    pub latencies: Vec<f64>,

    /// Messages received before a failure ended the session
    pub messages_before_failure: usize,

    /// How the session ended
    pub status: SessionStatus,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Wall-clock time spent measuring (excludes connection setup)
    pub measured_for: Duration,
}

impl SessionResult {
    /// A session that ran to its deadline
    pub fn completed(
        client_index: usize,
        match_id: MatchId,
        endpoint: String,
        latencies: Vec<f64>,
        started_at: DateTime<Utc>,
        measured_for: Duration,
    ) -> Self {
        Self {
            client_index,
            match_id,
            endpoint,
            latencies,
            messages_before_failure: 0,
            status: SessionStatus::Completed,
            started_at,
            measured_for,
        }
    }

    /// A session that failed; it contributes no samples
    pub fn failed(
        client_index: usize,
        match_id: MatchId,
        endpoint: String,
        reason: String,
        messages_before_failure: usize,
    ) -> Self {
        Self {
            client_index,
            match_id,
            endpoint,
            latencies: Vec::new(),
            messages_before_failure,
            status: SessionStatus::Failed { reason },
            started_at: Utc::now(),
            measured_for: Duration::ZERO,
        }
    }

    /// Number of messages that count toward the summary
    pub fn sample_count(&self) -> usize {
        self.latencies.len()
    }

    /// Sum of all latency samples, seconds
    pub fn total_latency(&self) -> f64 {
        self.latencies.iter().sum()
    }

    /// Mean latency of this session in milliseconds, if it saw any message
    pub fn mean_latency_ms(&self) -> Option<f64> {
        if self.latencies.is_empty() {
            None
        } else {
            Some(self.total_latency() * 1000.0 / self.latencies.len() as f64)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_result() {
        let result = SessionResult::completed(
            0,
            MatchId::new(42),
            "ws://localhost:5000/play?id=42".to_string(),
            vec![0.1, 0.3],
            Utc::now(),
            Duration::from_secs(1),
        );
        assert!(result.is_completed());
        assert_eq!(result.sample_count(), 2);
        assert!((result.total_latency() - 0.4).abs() < 1e-9);
        assert!((result.mean_latency_ms().unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_result_has_no_samples() {
        let result = SessionResult::failed(
            3,
            MatchId::new(7),
            "ws://localhost:5000/play?id=7".to_string(),
            "connection refused".to_string(),
            5,
        );
        assert!(!result.is_completed());
        assert_eq!(result.sample_count(), 0);
        assert_eq!(result.messages_before_failure, 5);
        assert_eq!(result.mean_latency_ms(), None);
        assert_eq!(
            result.status,
            SessionStatus::Failed { reason: "connection refused".to_string() }
        );
    }
}
