//! Configuration data model and validation

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base WebSocket URI; each client connects to `{endpoint_base}/play?id={match}`
    #[serde(default = "default_endpoint_base")]
    pub endpoint_base: String,

    /// Total simulated players, two per match
    #[serde(default = "default_games")]
    pub games: u32,

    /// Reserved send rate for a future outbound-input feature. Accepted and
    /// reported, but nothing is sent.
    #[serde(default = "default_inputs_per_second")]
    pub inputs_per_second: u32,

    /// Measurement window per session, in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,

    /// Upper bound on connection establishment, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_seconds: u64,

    /// Seed for the match id generator; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Emit the final summary as JSON
    #[serde(default)]
    pub json_output: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Only print the final report
    #[serde(default)]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_base: default_endpoint_base(),
            games: default_games(),
            inputs_per_second: default_inputs_per_second(),
            window_seconds: default_window_seconds(),
            connect_timeout_seconds: default_connect_timeout_secs(),
            seed: None,
            enable_color: default_enable_color(),
            json_output: false,
            verbose: false,
            debug: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurement window as Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs_f64(self.window_seconds.max(0.0))
    }

    /// Connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Number of clients actually spawned: `games` rounded down to even
    pub fn player_count(&self) -> u32 {
        (self.games / 2) * 2
    }

    /// Number of matches in the plan
    pub fn match_count(&self) -> u32 {
        self.games / 2
    }

    /// Validate the configuration and return the first error found
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_base.is_empty() {
            return Err(AppError::config("Endpoint base cannot be empty"));
        }

        match url::Url::parse(&self.endpoint_base) {
            Ok(parsed) => {
                if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                    return Err(AppError::config(format!(
                        "Endpoint base must use ws:// or wss://: {}",
                        self.endpoint_base
                    )));
                }
                if parsed.query().is_some() || parsed.fragment().is_some() {
                    return Err(AppError::config(format!(
                        "Endpoint base must not carry a query or fragment: {}",
                        self.endpoint_base
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid endpoint base '{}': {}",
                    self.endpoint_base, e
                )));
            }
        }

        if self.games < 2 {
            return Err(AppError::config("Games must be at least 2 (one match)"));
        }

        if self.games > crate::defaults::MAX_GAMES {
            return Err(AppError::config(format!(
                "Games cannot exceed {}",
                crate::defaults::MAX_GAMES
            )));
        }

        if self.inputs_per_second == 0 {
            return Err(AppError::config("Inputs per second must be greater than 0"));
        }

        if !self.window_seconds.is_finite() {
            return Err(AppError::config("Window duration must be a finite number of seconds"));
        }

        if self.window_seconds < 0.0 {
            return Err(AppError::config("Window duration cannot be negative"));
        }

        if self.window_seconds > crate::defaults::MAX_WINDOW_SECONDS as f64 {
            return Err(AppError::config(format!(
                "Window duration cannot exceed {} seconds",
                crate::defaults::MAX_WINDOW_SECONDS
            )));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(AppError::config("Connect timeout must be greater than 0"));
        }

        if self.connect_timeout_seconds > crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS {
            return Err(AppError::config(format!(
                "Connect timeout cannot exceed {} seconds",
                crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("ENDPOINT_BASE") {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                self.endpoint_base = endpoint.to_string();
            }
        }

        if let Ok(games) = std::env::var("GAMES") {
            self.games = games.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid GAMES value '{}': {}", games, e)))?;
        }

        if let Ok(rate) = std::env::var("INPUTS_PER_SECOND") {
            self.inputs_per_second = rate.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid INPUTS_PER_SECOND value '{}': {}", rate, e)))?;
        }

        if let Ok(window) = std::env::var("WINDOW_SECONDS") {
            self.window_seconds = window.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WINDOW_SECONDS value '{}': {}", window, e)))?;
        }

        if let Ok(timeout) = std::env::var("CONNECT_TIMEOUT_SECONDS") {
            self.connect_timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CONNECT_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(seed) = std::env::var("RNG_SEED") {
            self.seed = Some(seed.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid RNG_SEED value '{}': {}", seed, e)))?);
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_endpoint_base() -> String {
    crate::defaults::DEFAULT_ENDPOINT_BASE.to_string()
}

fn default_games() -> u32 {
    crate::defaults::DEFAULT_GAMES
}

fn default_inputs_per_second() -> u32 {
    crate::defaults::DEFAULT_INPUTS_PER_SECOND
}

fn default_window_seconds() -> f64 {
    crate::defaults::DEFAULT_WINDOW.as_secs_f64()
}

fn default_connect_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
