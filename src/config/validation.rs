//! Configuration validation utilities and rules
//!
//! Hard errors come from [`Config::validate`]; this module layers advisory
//! warnings on top for settings that are legal but likely surprising.

use crate::{
    error::{AppError, Result},
    models::Config,
};
use colored::*;

/// Above this many concurrent clients the local fd limit is a common
/// source of connect failures
const LARGE_POPULATION: u32 = 5_000;

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_endpoint(&config.endpoint_base)?);
        warnings.extend(Self::validate_population(config));
        warnings.extend(Self::validate_timing(config));
        Ok(warnings)
    }

    fn validate_endpoint(endpoint: &str) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| AppError::config(format!("Invalid endpoint base '{}': {}", endpoint, e)))?;

        let is_local = match parsed.host() {
            Some(url::Host::Domain(domain)) => domain == "localhost",
            Some(url::Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        };

        if parsed.scheme() == "ws" && !is_local {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Endpoint '{}' uses unencrypted ws:// to a remote host", endpoint),
            ));
        }

        if !parsed.path().is_empty() && parsed.path() != "/" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Endpoint '{}' has path '{}'; clients append /play to it",
                    endpoint,
                    parsed.path()
                ),
            ));
        }

        Ok(warnings)
    }

    fn validate_population(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.games % 2 == 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Games is odd ({}); matches need two players, so {} clients will be spawned",
                    config.games,
                    config.player_count()
                ),
            ));
        }

        if config.games > LARGE_POPULATION {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} concurrent connections may exceed the open file limit (check ulimit -n)",
                    config.games
                ),
            ));
        }

        if config.inputs_per_second != crate::defaults::DEFAULT_INPUTS_PER_SECOND {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Inputs per second is set to {} but is reserved: clients do not send inputs",
                    config.inputs_per_second
                ),
            ));
        }

        warnings
    }

    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.window_seconds == 0.0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Window is 0 seconds; no latency samples can be collected".to_string(),
            ));
        } else if config.window_seconds < 1.0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Window of {}s is short; few samples per session are expected",
                    config.window_seconds
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
