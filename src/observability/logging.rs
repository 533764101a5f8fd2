//! Structured logging bootstrap.
//!
//! # Responsibilities
//! - Map verbosity to a filter for the default logger and named loggers
//! - Turn down external loggers unless verbosity is at its maximum
//! - Wire text or JSON output to stdout (or a supplied writer)
//! - Install the uncaught panic hook
//!
//! # Design Decisions
//! - Logger names are tracing targets; the logger table becomes an `EnvFilter`
//! - The first call installs a global subscriber made of reload layers; later
//!   calls swap those layers, so the last call wins
//! - `log` records from dependencies are bridged by `try_init`

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter, ParseError};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{reload, Layer, Registry};

use crate::config::LoggingConfig;
use crate::observability::format::{LogFormat, TextFormat};
use crate::observability::panic_hook;
use crate::observability::verbosity::Verbosity;

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type OutputLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync + 'static>;

struct Handles {
    filter: reload::Handle<EnvFilter, Registry>,
    output: reload::Handle<OutputLayer, FilteredRegistry>,
}

static HANDLES: Mutex<Option<Handles>> = Mutex::new(None);

/// Errors raised while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid logger name {name:?}: {source}")]
    Directive {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
    #[error("failed to reload logging configuration: {0}")]
    Reload(#[from] reload::Error),
    #[error("logging configuration lock poisoned")]
    Poisoned,
}

/// Configuration shared by every entry of the logger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level: Level,
}

/// Build the table of loggers to configure.
///
/// Always includes the default logger under `""`.
pub fn build_loggers_dictionary<C: Clone>(
    loggers: Option<&[&str]>,
    logger_config: C,
) -> BTreeMap<String, C> {
    let mut logger_dict = BTreeMap::new();
    logger_dict.insert(String::new(), logger_config.clone());
    if let Some(loggers) = loggers {
        for logger in loggers {
            logger_dict.insert((*logger).to_string(), logger_config.clone());
        }
    }
    logger_dict
}

/// Configure logging for the process.
///
/// Logging is written to stdout. `external_logs` are turned down to `WARN`
/// unless `verbosity` is [`Verbosity::Max`]; `loggers_to_configure` get the
/// same configuration as the default logger.
pub fn default_logging(
    verbosity: Verbosity,
    log_format: LogFormat,
    external_logs: Option<&[&str]>,
    loggers_to_configure: Option<&[&str]>,
) -> Result<(), LoggingError> {
    let mut setup = LoggingSetup::new(verbosity).format(log_format);
    if let Some(external_logs) = external_logs {
        setup = setup.external_logs(external_logs.iter().copied());
    }
    if let Some(loggers) = loggers_to_configure {
        setup = setup.loggers(loggers.iter().copied());
    }
    setup.install()
}

/// Builder for the process logging configuration.
pub struct LoggingSetup {
    verbosity: Verbosity,
    format: LogFormat,
    external_logs: Vec<String>,
    loggers: Vec<String>,
    writer: Option<BoxMakeWriter>,
}

impl LoggingSetup {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            format: LogFormat::default(),
            external_logs: Vec::new(),
            loggers: Vec::new(),
            writer: None,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.verbosity)
            .format(config.format)
            .external_logs(config.external_logs.iter().cloned())
            .loggers(config.loggers.iter().cloned())
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Loggers outside this project, turned down to `WARN` below max verbosity.
    pub fn external_logs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_logs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Loggers configured identically to the default logger.
    pub fn loggers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loggers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Write somewhere other than stdout.
    pub fn writer(mut self, writer: BoxMakeWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// The logger table this setup resolves to, after external loggers
    /// have been turned down.
    pub fn logger_table(&self) -> BTreeMap<String, LoggerConfig> {
        let config = LoggerConfig {
            level: self.verbosity.level(),
        };
        let names: Vec<&str> = self.loggers.iter().map(String::as_str).collect();
        let mut table = build_loggers_dictionary(Some(&names), config);

        if self.verbosity < Verbosity::Max {
            for name in &self.external_logs {
                table.insert(name.clone(), LoggerConfig { level: Level::WARN });
            }
        }
        table
    }

    /// Build the filter for the logger table.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let table = self.logger_table();
        let default_level = table
            .get("")
            .map_or(self.verbosity.level(), |config| config.level);

        let mut filter = EnvFilter::default().add_directive(LevelFilter::from_level(default_level).into());
        for (name, config) in table.iter().filter(|(name, _)| !name.is_empty()) {
            let directive: Directive = format!("{}={}", name, LevelFilter::from_level(config.level))
                .parse()
                .map_err(|source| LoggingError::Directive {
                    name: name.clone(),
                    source,
                })?;
            filter = filter.add_directive(directive);
        }
        Ok(filter)
    }

    fn output_layer(writer: BoxMakeWriter, format: LogFormat) -> OutputLayer {
        match format {
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .event_format(TextFormat)
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_writer(writer)
                .boxed(),
        }
    }

    /// Apply the configuration process-wide.
    ///
    /// Calling this again re-applies the whole configuration.
    pub fn install(self) -> Result<(), LoggingError> {
        let filter = self.env_filter()?;
        let writer = self
            .writer
            .unwrap_or_else(|| BoxMakeWriter::new(std::io::stdout));
        let output = Self::output_layer(writer, self.format);

        let mut handles = HANDLES.lock().map_err(|_| LoggingError::Poisoned)?;
        match handles.as_ref() {
            Some(existing) => {
                existing.filter.reload(filter)?;
                existing.output.reload(output)?;
            }
            None => {
                let (filter_layer, filter_handle) = reload::Layer::new(filter);
                let (output_layer, output_handle) = reload::Layer::new(output);
                tracing_subscriber::registry()
                    .with(filter_layer)
                    .with(output_layer)
                    .try_init()?;
                *handles = Some(Handles {
                    filter: filter_handle,
                    output: output_handle,
                });
            }
        }
        drop(handles);

        panic_hook::install();

        tracing::debug!(
            verbosity = self.verbosity.ordinal(),
            format = ?self.format,
            "Logging configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_loggers_should_include_default() {
        let logger_config = LoggerConfig { level: Level::INFO };

        let logger_dict = build_loggers_dictionary(None, logger_config);

        assert_eq!(logger_dict.len(), 1);
        assert_eq!(logger_dict[""], logger_config);
    }

    #[test]
    fn test_multiple_loggers_should_be_included() {
        let logger_config = "my config".to_string();
        let names: Vec<String> = (0..5).map(|i| format!("logger_{i}")).collect();
        let loggers: Vec<&str> = names.iter().map(String::as_str).collect();

        let logger_dict = build_loggers_dictionary(Some(&loggers), logger_config.clone());

        assert_eq!(logger_dict.len(), 6);
        assert_eq!(logger_dict[""], logger_config);
        for logger in &loggers {
            assert_eq!(logger_dict[*logger], logger_config);
        }
    }

    #[test]
    fn test_exact_table_for_two_loggers() {
        let cfg = LoggerConfig { level: Level::DEBUG };
        let table = build_loggers_dictionary(Some(&["a", "b"]), cfg);
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["", "a", "b"]);
        assert!(table.values().all(|c| *c == cfg));
    }

    #[test]
    fn test_external_logs_turned_down_below_max() {
        let setup = LoggingSetup::new(Verbosity::Debug)
            .external_logs(["hyper"])
            .loggers(["worker"]);
        let table = setup.logger_table();

        assert_eq!(table[""].level, Level::DEBUG);
        assert_eq!(table["worker"].level, Level::DEBUG);
        assert_eq!(table["hyper"].level, Level::WARN);
    }

    #[test]
    fn test_external_logs_untouched_at_max() {
        let setup = LoggingSetup::new(Verbosity::Max).external_logs(["hyper"]);
        let table = setup.logger_table();

        assert!(!table.contains_key("hyper"));
        assert_eq!(table[""].level, Level::DEBUG);
    }

    #[test]
    fn test_external_log_wins_over_configured_logger() {
        let setup = LoggingSetup::new(Verbosity::Info)
            .loggers(["shared"])
            .external_logs(["shared"]);
        assert_eq!(setup.logger_table()["shared"].level, Level::WARN);
    }

    #[test]
    fn test_env_filter_renders_directives() {
        let filter = LoggingSetup::new(Verbosity::Info)
            .external_logs(["hyper"])
            .loggers(["my_service::jobs"])
            .env_filter()
            .unwrap();
        let rendered = filter.to_string();

        assert!(rendered.contains("hyper=warn"), "got: {rendered}");
        assert!(rendered.contains("my_service::jobs=info"), "got: {rendered}");
        assert!(rendered.contains("info"), "got: {rendered}");
    }
}
