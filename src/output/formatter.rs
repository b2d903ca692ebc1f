//! Core formatting traits and the plain text implementation

use crate::{
    error::Result,
    models::{Config, SessionResult, SessionStatus},
    stats::{LatencyDistribution, RunSummary},
};
use std::fmt::Write as _;

/// Main trait for report formatting
pub trait OutputFormatter: Send + Sync {
    /// Banner printed before any client is spawned
    fn format_run_header(&self, header: &RunHeader) -> Result<String>;

    /// Final latency report
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;

    /// One line per client, for verbose runs
    fn format_session_breakdown(&self, results: &[SessionResult]) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Include the latency spread and per-session lines
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// What a run is about to do
#[derive(Debug, Clone, PartialEq)]
pub struct RunHeader {
    pub endpoint_base: String,
    pub games: u32,
    pub players: usize,
    pub matches: usize,
    pub window_secs: f64,
    pub inputs_per_second: u32,
}

impl RunHeader {
    pub fn new(config: &Config, players: usize) -> Self {
        Self {
            endpoint_base: config.endpoint_base.clone(),
            games: config.games,
            players,
            matches: players / 2,
            window_secs: config.window_seconds,
            inputs_per_second: config.inputs_per_second,
        }
    }
}

/// Latency line shared by every formatter
pub(crate) fn latency_line(summary: &RunSummary) -> String {
    match summary.mean_latency_ms_rounded() {
        Some(mean) => format!(
            "Average latency: {:.3} ms, {} inputs received",
            mean, summary.total_inputs
        ),
        None => format!(
            "No data collected: 0 inputs received from {} sessions",
            summary.players
        ),
    }
}

pub(crate) fn total_time_line(summary: &RunSummary) -> String {
    format!("Total time: {:.2} seconds", summary.elapsed_secs_rounded())
}

pub(crate) fn spread_line(distribution: &LatencyDistribution) -> String {
    let mut line = format!("Latency spread: min {:.3} ms", distribution.min_ms);
    for (name, value) in &distribution.percentiles {
        let _ = write!(line, ", {} {:.3} ms", name, value);
    }
    let _ = write!(
        line,
        ", max {:.3} ms, std dev {:.3} ms",
        distribution.max_ms, distribution.std_dev_ms
    );
    line
}

pub(crate) fn session_line(result: &SessionResult) -> String {
    match &result.status {
        SessionStatus::Completed => format!(
            "  #{:<5} match {:<10} {} samples, mean {}",
            result.client_index,
            result.match_id,
            result.sample_count(),
            result
                .mean_latency_ms()
                .map(|ms| format!("{:.3} ms", ms))
                .unwrap_or_else(|| "n/a".to_string())
        ),
        SessionStatus::Failed { reason } => format!(
            "  #{:<5} match {:<10} failed after {} messages: {}",
            result.client_index, result.match_id, result.messages_before_failure, reason
        ),
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_run_header(&self, header: &RunHeader) -> Result<String> {
        let mut output = String::new();
        writeln!(
            output,
            "Running {} players in {} matches against {} for {} seconds",
            header.players, header.matches, header.endpoint_base, header.window_secs
        )?;
        write!(
            output,
            "Inputs per second: {} (not sent by clients)",
            header.inputs_per_second
        )?;
        Ok(output)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "{}", latency_line(summary))?;
        if self.options.verbose_mode {
            writeln!(
                output,
                "Sessions: {} completed, {} failed",
                summary.completed_sessions, summary.failed_sessions
            )?;
            if let Some(distribution) = &summary.distribution {
                writeln!(output, "{}", spread_line(distribution))?;
            }
        }
        write!(output, "{}", total_time_line(summary))?;
        Ok(output)
    }

    fn format_session_breakdown(&self, results: &[SessionResult]) -> Result<String> {
        let mut output = String::from("Sessions:");
        for result in results {
            write!(output, "\n{}", session_line(result))?;
        }
        Ok(output)
    }
}
