//! Command-line interface

use clap::Parser;

const AFTER_HELP: &str = "\
Environment variables (overridden by flags, read after .env):
  ENDPOINT_BASE            WebSocket base URL
  GAMES                    Number of players to spawn
  INPUTS_PER_SECOND        Reserved input rate
  WINDOW_SECONDS           Measurement window per session
  CONNECT_TIMEOUT_SECONDS  Connection establishment limit
  ENABLE_COLOR             true/false
  RNG_SEED                 Seed for reproducible match ids

Examples:
  mlt --endpoint-base ws://localhost:5000 --games 200 --window 30
  mlt --games 10 --window 5 --seed 42 --json";

/// Match Load Tester - measure server-pushed update latency across simulated match players
#[derive(Parser, Debug, Clone)]
#[command(name = "mlt")]
#[command(version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// WebSocket base URL; clients connect to {base}/play?id={match}
    #[arg(long, visible_alias = "uri", value_name = "URL")]
    pub endpoint_base: Option<String>,

    /// Number of players to spawn, two per match
    #[arg(short, long)]
    pub games: Option<u32>,

    /// Input rate per player (reserved, clients do not send inputs yet)
    #[arg(long, visible_alias = "inputs", value_name = "RATE")]
    pub inputs_per_second: Option<u32>,

    /// Measurement window per session in seconds
    #[arg(short, long, visible_alias = "time", value_name = "SECONDS", value_parser = parse_window)]
    pub window: Option<f64>,

    /// Connection establishment timeout in seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_connect_timeout)]
    pub connect_timeout: Option<u64>,

    /// Seed for match id generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output with per-session results
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Only print the report and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.quiet && (self.verbose || self.debug) {
            return Err("Cannot combine --quiet with --verbose or --debug".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        fn or_default<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "(default)".to_string())
        }

        let mut summary = String::new();
        summary.push_str("Command-line Arguments:\n");
        summary.push_str(&format!("  Endpoint base: {}\n", or_default(&self.endpoint_base)));
        summary.push_str(&format!("  Games: {}\n", or_default(&self.games)));
        summary.push_str(&format!("  Inputs per second: {}\n", or_default(&self.inputs_per_second)));
        summary.push_str(&format!("  Window: {}\n", or_default(&self.window)));
        summary.push_str(&format!("  Connect timeout: {}\n", or_default(&self.connect_timeout)));
        summary.push_str(&format!("  Seed: {}\n", or_default(&self.seed)));
        summary.push_str(&format!("  JSON output: {}\n", self.json));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));
        summary
    }
}

/// Parse a window length in seconds; fractions allowed, negatives rejected
fn parse_window(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid window: {}", s))?;

    if !secs.is_finite() {
        Err(format!("Invalid window: {}", s))
    } else if secs < 0.0 {
        Err("Window cannot be negative".to_string())
    } else if secs > crate::defaults::MAX_WINDOW_SECONDS as f64 {
        Err(format!(
            "Window cannot exceed {} seconds",
            crate::defaults::MAX_WINDOW_SECONDS
        ))
    } else {
        Ok(secs)
    }
}

/// Parse connect timeout from seconds string
fn parse_connect_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS {
                Err(format!(
                    "Duration cannot exceed {} seconds",
                    crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS
                ))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(&["mlt", "--games", "20", "--window", "2.5"]);
        assert_eq!(cli.games, Some(20));
        assert_eq!(cli.window, Some(2.5));
        assert_eq!(cli.endpoint_base, None);
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from(&[
            "mlt",
            "--endpoint-base", "ws://10.0.0.5:5000",
            "--games", "50",
            "--inputs-per-second", "8",
            "--window", "30",
            "--connect-timeout", "5",
            "--seed", "42",
            "--json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.endpoint_base.as_deref(), Some("ws://10.0.0.5:5000"));
        assert_eq!(cli.games, Some(50));
        assert_eq!(cli.inputs_per_second, Some(8));
        assert_eq!(cli.window, Some(30.0));
        assert_eq!(cli.connect_timeout, Some(5));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.json);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_legacy_aliases() {
        let cli = Cli::parse_from(&["mlt", "--uri", "ws://host:1", "--inputs", "2", "--time", "3"]);
        assert_eq!(cli.endpoint_base.as_deref(), Some("ws://host:1"));
        assert_eq!(cli.inputs_per_second, Some(2));
        assert_eq!(cli.window, Some(3.0));
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!(parse_window("0"), Ok(0.0));
        assert_eq!(parse_window("0.25"), Ok(0.25));
        assert_eq!(parse_window("3600"), Ok(3600.0));
        assert!(parse_window("-1").is_err());
        assert!(parse_window("3601").is_err());
        assert!(parse_window("abc").is_err());
        assert!(parse_window("NaN").is_err());
        assert!(parse_window("inf").is_err());
    }

    #[test]
    fn test_negative_window_rejected_by_parser() {
        let result = Cli::try_parse_from(&["mlt", "--window", "-5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_connect_timeout_parsing() {
        assert_eq!(parse_connect_timeout("1"), Ok(1));
        assert_eq!(parse_connect_timeout("300"), Ok(300));
        assert!(parse_connect_timeout("0").is_err());
        assert!(parse_connect_timeout("301").is_err());
        assert!(parse_connect_timeout("+5").is_err());
        assert!(parse_connect_timeout("0x10").is_err());
    }

    #[test]
    fn test_use_colors_method() {
        let cli_no_color = Cli::parse_from(&["mlt", "--no-color"]);
        assert!(!cli_no_color.use_colors());

        let cli_color = Cli::parse_from(&["mlt", "--color"]);
        assert!(cli_color.use_colors());

        let cli_json = Cli::parse_from(&["mlt", "--json"]);
        assert!(!cli_json.use_colors());
    }

    #[test]
    fn test_cli_validation() {
        let cli = Cli::parse_from(&["mlt", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(&["mlt", "--quiet", "--verbose"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(&["mlt", "--verbose", "--debug"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(&["mlt", "--games", "12", "--no-color"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Games: 12"));
        assert!(summary.contains("Window: (default)"));
        assert!(summary.contains("Colored output: false"));
    }
}
