//! Structured logging for the match load tester
//!
//! Every entry carries the run id so the notices of one load test can be
//! correlated. Console output is human-readable; `--debug` switches to one
//! JSON object per line with source locations.

use crate::error::AppError;
use crate::models::{Config, SessionResult, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    /// A session ended early; the run goes on
    Warn = 3,
    /// A session task died; the run still goes on
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }

    /// Lowest level shown for a configuration
    pub fn threshold(config: &Config) -> Self {
        if config.debug || config.verbose {
            LogLevel::Debug
        } else if config.quiet {
            LogLevel::Error
        } else {
            LogLevel::Info
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that emitted the entry
    pub logger: String,
    pub fields: HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Console,
    /// One JSON object per line
    Json,
}

/// Leveled logger bound to one component name
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    /// Keep stdout free for the report
    stderr_only: bool,
    name: String,
    run_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: LogLevel::threshold(config),
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            stderr_only: config.json_output,
            name,
            run_id: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_run_id(&self, run_id: String) {
        *self.run_id.write().await = Some(run_id);
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Error, message)
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        if let Some(run_id) = self.run_id.read().await.as_ref() {
            entry
                .fields
                .insert("run_id".to_string(), serde_json::Value::String(run_id.clone()));
        }

        let output = self.format_entry(&entry);

        if self.stderr_only || entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_else(|_| {
                format!("{{\"level\":\"{}\",\"message\":{:?}}}", entry.level.as_str(), entry.message)
            }),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), entry.level.as_str(), LogLevel::reset_code())
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut output = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.logger,
            entry.message
        );

        // run_id is noise on a terminal; JSON keeps it
        let mut fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "run_id")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !fields.is_empty() {
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }
}

/// Builder for one log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Per-session measurement fields
    pub fn session(self, result: &SessionResult) -> Self {
        self.field("client", result.client_index)
            .field("match_id", result.match_id)
            .field("samples", result.sample_count())
            .field("mean_ms", result.mean_latency_ms())
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Per-client connection lifecycle notices
pub struct SessionLogger {
    logger: Logger,
}

impl SessionLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("SESSION".to_string(), config),
        }
    }

    pub async fn log_connected(&self, client_index: usize, endpoint: &str) {
        self.logger
            .info(&format!("Connected to {}", endpoint))
            .field("client", client_index)
            .log()
            .await;
    }

    pub async fn log_connect_failed(&self, client_index: usize, endpoint: &str, error: &AppError) {
        self.logger
            .warn(&format!("Failed to connect to {}: {}", endpoint, error))
            .field("client", client_index)
            .error_info(error)
            .log()
            .await;
    }

    /// Close notice, or a warning when the session ended early
    pub async fn log_closed(&self, result: &SessionResult) {
        match &result.status {
            SessionStatus::Completed => {
                self.logger
                    .info(&format!("Closing connection to {}", result.endpoint))
                    .session(result)
                    .log()
                    .await;
            }
            SessionStatus::Failed { reason } => {
                self.logger
                    .warn(&format!("Session for {} ended early: {}", result.endpoint, reason))
                    .session(result)
                    .field("messages_before_failure", result.messages_before_failure)
                    .log()
                    .await;
            }
        }
    }

    /// The client's task panicked or was cancelled before producing a result
    pub async fn log_task_aborted(&self, client_index: usize, endpoint: &str, reason: &str) {
        self.logger
            .error(&format!("Session task for {} aborted: {}", endpoint, reason))
            .field("client", client_index)
            .log()
            .await;
    }
}

/// Hands out loggers that share one run id
pub struct LoggerFactory {
    config: Config,
    run_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_run_id(self.run_id.clone()).await;
        logger
    }

    pub async fn create_session_logger(&self) -> SessionLogger {
        SessionLogger {
            logger: self.create_logger("SESSION").await,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Log with the caller's source location
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
