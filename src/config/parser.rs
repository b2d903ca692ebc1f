//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the configuration: defaults, then .env, then the process
    /// environment, then CLI flags. Validated before returning.
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::validation)?;

        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        if self.cli.debug {
            for warning in EnvManager::validate_current_env() {
                eprintln!("Environment: {}", warning);
            }
        }

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        if config.debug {
            eprintln!("{}", display_config_summary(&config));
        }

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref endpoint) = self.cli.endpoint_base {
            config.endpoint_base = endpoint.clone();
        }

        if let Some(games) = self.cli.games {
            config.games = games;
        }

        if let Some(rate) = self.cli.inputs_per_second {
            config.inputs_per_second = rate;
        }

        if let Some(window) = self.cli.window {
            config.window_seconds = window;
        }

        if let Some(timeout) = self.cli.connect_timeout {
            config.connect_timeout_seconds = timeout;
        }

        if self.cli.seed.is_some() {
            config.seed = self.cli.seed;
        }

        if self.cli.color {
            config.enable_color = true;
        } else if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // Output mode flags are CLI-only
        config.json_output = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
        config.quiet = self.cli.quiet;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Endpoint base: {}", config.endpoint_base));
    summary.push(format!(
        "Games: {} ({} players, {} matches)",
        config.games,
        config.player_count(),
        config.match_count()
    ));
    summary.push(format!("Inputs per second: {} (reserved)", config.inputs_per_second));
    summary.push(format!("Window: {}s", config.window_seconds));
    summary.push(format!("Connect timeout: {}s", config.connect_timeout_seconds));
    summary.push(format!(
        "Seed: {}",
        config
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string())
    ));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("JSON Output: {}", config.json_output));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
