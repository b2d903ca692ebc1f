//! Colored formatter implementation with terminal color support

use crate::{
    error::Result,
    models::{SessionResult, SessionStatus},
    stats::RunSummary,
};
use super::formatter::{
    latency_line, session_line, spread_line, total_time_line, FormattingOptions, OutputFormatter,
    PlainFormatter, RunHeader,
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    /// Determine performance level from a mean latency in milliseconds
    pub fn from_latency(latency_ms: f64) -> Self {
        if latency_ms < 50.0 {
            Self::Excellent
        } else if latency_ms < 100.0 {
            Self::Good
        } else if latency_ms < 300.0 {
            Self::Fair
        } else if latency_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are off
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn sessions_line(&self, summary: &RunSummary) -> String {
        let failed = format!("{} failed", summary.failed_sessions);
        let failed_color = if summary.failed_sessions == 0 {
            self.color_scheme.muted
        } else {
            self.color_scheme.warning
        };
        format!(
            "Sessions: {}, {}",
            self.colorize(
                &format!("{} completed", summary.completed_sessions),
                self.color_scheme.success
            ),
            self.colorize(&failed, failed_color)
        )
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_run_header(&self, header: &RunHeader) -> Result<String> {
        let mut output = String::new();
        writeln!(
            output,
            "{} {} players in {} matches against {} for {} seconds",
            self.emphasize("Running", self.color_scheme.header),
            self.bold(&header.players.to_string()),
            self.bold(&header.matches.to_string()),
            header.endpoint_base,
            header.window_secs
        )?;
        write!(
            output,
            "{}",
            self.dimmed(&format!(
                "Inputs per second: {} (not sent by clients)",
                header.inputs_per_second
            ))
        )?;
        Ok(output)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        let latency = latency_line(summary);
        match summary.mean_latency_ms {
            Some(mean) => {
                let level = PerformanceLevel::from_latency(mean);
                writeln!(output, "{}", self.emphasize(&latency, level.color()))?;
            }
            None => writeln!(output, "{}", self.colorize(&latency, self.color_scheme.error))?,
        }

        if self.options.verbose_mode {
            if let Some(mean) = summary.mean_latency_ms {
                let level = PerformanceLevel::from_latency(mean);
                writeln!(
                    output,
                    "Latency rating: {}",
                    self.colorize(level.description(), level.color())
                )?;
            }
            writeln!(output, "{}", self.sessions_line(summary))?;
            if let Some(distribution) = &summary.distribution {
                writeln!(output, "{}", self.dimmed(&spread_line(distribution)))?;
            }
        }

        write!(output, "{}", total_time_line(summary))?;
        Ok(output)
    }

    fn format_session_breakdown(&self, results: &[SessionResult]) -> Result<String> {
        if !self.options.enable_color {
            return self.plain_formatter.format_session_breakdown(results);
        }

        let mut output = format!("{}", "Sessions:".bold().color(self.color_scheme.header));
        for result in results {
            let line = session_line(result);
            let colored_line = match result.status {
                SessionStatus::Completed => line.normal(),
                SessionStatus::Failed { .. } => line.color(self.color_scheme.warning),
            };
            write!(output, "\n{}", colored_line)?;
        }
        Ok(output)
    }
}
