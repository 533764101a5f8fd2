//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::observability::{LogFormat, Verbosity};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Process logging settings.
    pub logging: LoggingConfig,

    /// HTTP request logging middleware settings.
    pub request_logging: RequestLoggingConfig,
}

/// Process logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Verbosity ordinal (0 = warning, 1 = info, 2 = debug, 3+ = max).
    pub verbosity: Verbosity,

    /// Output format ("text" or "json").
    pub format: LogFormat,

    /// External loggers turned down to warning unless verbosity is max.
    pub external_logs: Vec<String>,

    /// Loggers configured identically to the default logger.
    pub loggers: Vec<String>,
}

/// Request logging middleware configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RequestLoggingConfig {
    /// Level every request event is written at.
    pub level: LogLevel,

    /// Error status codes that never produce an error event.
    pub ignored_status_codes: Vec<u16>,

    /// Attach the request body to error events.
    pub include_request_in_failed_requests: bool,

    /// Attach the response body to error events.
    pub include_response_in_failed_requests: bool,

    /// Largest body buffered for error events, in bytes.
    pub max_body_bytes: usize,
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ignored_status_codes: Vec::new(),
            include_request_in_failed_requests: false,
            include_response_in_failed_requests: false,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log level as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}
