//! Error handling for the match load tester

use thiserror::Error;

/// Custom error types for the match load tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure to establish or maintain a connection for one session
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout errors (connection establishment only; an elapsed window is not an error)
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Test execution errors
    #[error("Test execution error: {0}")]
    TestExecution(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new test execution error
    pub fn test_execution<S: Into<String>>(message: S) -> Self {
        Self::TestExecution(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Connection(_) => "CONNECTION",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::TestExecution(_) => "TEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Session-scoped errors are isolated to the session that raised them
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => false,
            Self::Io(_) | Self::TestExecution(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the endpoint URL, game count and window duration.", msg)
            }
            Self::Connection(msg) => {
                format!("Connection failed: {}\n\nSuggestion: Make sure the game server is running and reachable at the endpoint base.", msg)
            }
            Self::Timeout(msg) => {
                format!("Connection timed out: {}\n\nSuggestion: Increase --connect-timeout or reduce --games.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration files.", msg)
            }
            Self::TestExecution(msg) => {
                format!("Load test failed: {}\n\nSuggestion: Check system resources (open file limits) and try again.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Connection(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::TestExecution(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Connection(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::TestExecution(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match error {
            WsError::Url(e) => Self::validation(format!("Invalid WebSocket URL: {}", e)),
            other => Self::connection(other.to_string()),
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(error: std::fmt::Error) -> Self {
        Self::internal(format!("Formatting error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user feedback on fatal errors
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way it is shown on stderr
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if self.verbose {
            out.push_str("\n\n");
            out.push_str(&error.user_friendly_message());
        }
        out
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = AppError::config("bad endpoint");
        assert!(matches!(config_err, AppError::Config(_)));
        assert_eq!(config_err.to_string(), "Configuration error: bad endpoint");

        let conn_err = AppError::connection("refused");
        assert!(matches!(conn_err, AppError::Connection(_)));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::validation("x").category(), "VALIDATION");
        assert_eq!(AppError::connection("x").category(), "CONNECTION");
        assert_eq!(AppError::timeout("x").category(), "TIMEOUT");
        assert_eq!(AppError::internal("x").category(), "INTERNAL");
    }

    #[test]
    fn test_recoverability() {
        assert!(AppError::connection("x").is_recoverable());
        assert!(AppError::timeout("x").is_recoverable());
        assert!(!AppError::config("x").is_recoverable());
        assert!(!AppError::validation("x").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), 1);
        assert_eq!(AppError::validation("x").exit_code(), 1);
        assert_eq!(AppError::parse("x").exit_code(), 1);
        assert_eq!(AppError::connection("x").exit_code(), 2);
        assert_eq!(AppError::timeout("x").exit_code(), 3);
        assert_eq!(AppError::test_execution("x").exit_code(), 6);
        assert_eq!(AppError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_console_formatting_plain() {
        let err = AppError::validation("window must not be negative");
        assert_eq!(
            err.format_for_console(false),
            "[VALIDATION] Validation error: window must not be negative"
        );
    }

    #[test]
    fn test_conversions() {
        let parse_err: AppError = "x".parse::<u32>().unwrap_err().into();
        assert!(matches!(parse_err, AppError::Parse(_)));

        let url_err: AppError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(url_err, AppError::Parse(_)));

        let io_err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io_err, AppError::Io(_)));
    }

    #[test]
    fn test_reporter_verbose_adds_suggestion() {
        let reporter = ErrorReporter::new(false, true);
        let rendered = reporter.render(&AppError::connection("refused"));
        assert!(rendered.starts_with("[CONNECTION]"));
        assert!(rendered.contains("Suggestion:"));

        let terse = ErrorReporter::new(false, false).render(&AppError::connection("refused"));
        assert!(!terse.contains("Suggestion:"));
    }
}
