//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load an env file if it exists. Variables already set in the process
    /// environment are left untouched.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path).map_err(|e| {
                AppError::config(format!("Failed to load {}: {}", path.display(), e))
            })?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "ENDPOINT_BASE" => {
                let parsed = url::Url::parse(value).map_err(|e| {
                    AppError::config(format!("Invalid ENDPOINT_BASE value '{}': {}", value, e))
                })?;
                if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                    return Err(AppError::config(format!(
                        "ENDPOINT_BASE must use ws:// or wss://, got: {}",
                        value
                    )));
                }
            }
            "GAMES" => {
                let games: u32 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid GAMES value '{}': {}", value, e))
                })?;
                if games < 2 || games > crate::defaults::MAX_GAMES {
                    return Err(AppError::config(format!(
                        "GAMES must be between 2 and {}, got: {}",
                        crate::defaults::MAX_GAMES,
                        games
                    )));
                }
            }
            "INPUTS_PER_SECOND" => {
                let rate: u32 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid INPUTS_PER_SECOND value '{}': {}", value, e))
                })?;
                if rate == 0 {
                    return Err(AppError::config("INPUTS_PER_SECOND must be greater than 0"));
                }
            }
            "WINDOW_SECONDS" => {
                let window: f64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid WINDOW_SECONDS value '{}': {}", value, e))
                })?;
                if !window.is_finite()
                    || window < 0.0
                    || window > crate::defaults::MAX_WINDOW_SECONDS as f64
                {
                    return Err(AppError::config(format!(
                        "WINDOW_SECONDS must be between 0 and {}, got: {}",
                        crate::defaults::MAX_WINDOW_SECONDS,
                        value
                    )));
                }
            }
            "CONNECT_TIMEOUT_SECONDS" => {
                let timeout: u64 = value.parse().map_err(|e| {
                    AppError::config(format!(
                        "Invalid CONNECT_TIMEOUT_SECONDS value '{}': {}",
                        value, e
                    ))
                })?;
                if timeout == 0 || timeout > crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!(
                        "CONNECT_TIMEOUT_SECONDS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_CONNECT_TIMEOUT_SECONDS,
                        timeout
                    )));
                }
            }
            "RNG_SEED" => {
                value.parse::<u64>().map_err(|e| {
                    AppError::config(format!("Invalid RNG_SEED value '{}': {}", value, e))
                })?;
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>().map_err(|e| {
                    AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e))
                })?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables with descriptions and examples
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("ENDPOINT_BASE", "WebSocket base URL of the game server", "ws://localhost:5000"),
            ("GAMES", "Number of players to spawn (2-100000)", "100"),
            ("INPUTS_PER_SECOND", "Reserved input rate per player", "4"),
            ("WINDOW_SECONDS", "Measurement window per session (0-3600)", "10"),
            ("CONNECT_TIMEOUT_SECONDS", "Connection timeout (1-300)", "10"),
            ("RNG_SEED", "Seed for reproducible match ids", "42"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(e.to_string());
                }
            }
        }

        warnings
    }
}
