//! Run report formatting
//!
//! Human-readable reports come in a colored and a plain flavour; `--json`
//! replaces both with a machine-readable document on stdout.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter, RunHeader};

use crate::{
    error::Result,
    models::{Config, SessionResult},
    stats::RunSummary,
};
use serde::Serialize;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Machine-readable run report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub endpoint_base: &'a str,
    pub games: u32,
    pub window_seconds: f64,
    pub seed: Option<u64>,
    pub summary: &'a RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<&'a [SessionResult]>,
}

/// Renders every part of a run report for one configuration
pub struct ReportPrinter {
    formatter: Box<dyn OutputFormatter>,
    json_output: bool,
    verbose: bool,
}

impl ReportPrinter {
    pub fn new(config: &Config) -> Self {
        Self {
            formatter: OutputFormatterFactory::create_formatter(config.enable_color, config.verbose),
            json_output: config.json_output,
            verbose: config.verbose,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_output
    }

    /// Banner shown before spawning; `None` in JSON mode
    pub fn render_header(&self, header: &RunHeader) -> Result<Option<String>> {
        if self.json_output {
            return Ok(None);
        }
        self.formatter.format_run_header(header).map(Some)
    }

    /// Final report text
    pub fn render_report(
        &self,
        config: &Config,
        summary: &RunSummary,
        results: &[SessionResult],
    ) -> Result<String> {
        if self.json_output {
            return render_json(config, summary, self.verbose.then_some(results));
        }

        let mut output = String::new();
        if self.verbose && !results.is_empty() {
            output.push_str(&self.formatter.format_session_breakdown(results)?);
            output.push('\n');
        }
        output.push_str(&self.formatter.format_summary(summary)?);
        Ok(output)
    }
}

/// Pretty-printed JSON report; per-session results only when given
pub fn render_json(
    config: &Config,
    summary: &RunSummary,
    sessions: Option<&[SessionResult]>,
) -> Result<String> {
    let report = JsonReport {
        version: crate::VERSION,
        endpoint_base: &config.endpoint_base,
        games: config.games,
        window_seconds: config.window_seconds,
        seed: config.seed,
        summary,
        sessions,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary() -> RunSummary {
        RunSummary::from_results(&[], Duration::from_millis(1500))
    }

    #[test]
    fn test_json_report_shape() {
        let config = Config {
            seed: Some(5),
            ..Config::default()
        };
        let text = render_json(&config, &summary(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["games"], 100);
        assert_eq!(value["seed"], 5);
        assert_eq!(value["summary"]["total_inputs"], 0);
        assert!(value["summary"]["mean_latency_ms"].is_null());
        assert!(value.get("sessions").is_none());
    }

    #[test]
    fn test_json_mode_skips_banner() {
        let config = Config {
            json_output: true,
            ..Config::default()
        };
        let printer = ReportPrinter::new(&config);
        let header = RunHeader::new(&config, 100);
        assert!(printer.is_json());
        assert_eq!(printer.render_header(&header).unwrap(), None);
    }

    #[test]
    fn test_plain_report() {
        let config = Config {
            enable_color: false,
            ..Config::default()
        };
        let printer = ReportPrinter::new(&config);
        let text = printer.render_report(&config, &summary(), &[]).unwrap();
        assert!(text.contains("No data collected"));
        assert!(text.contains("Total time: 1.50 seconds"));
    }
}
