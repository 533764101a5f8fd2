//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::observability::{LogFormat, Verbosity};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [logging]
            verbosity = 5
            format = "json"
            external_logs = ["hyper", "h2"]
            loggers = ["worker"]

            [request_logging]
            level = "debug"
            ignored_status_codes = [404, 401]
            include_request_in_failed_requests = true
            max_body_bytes = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.verbosity, Verbosity::Max);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.external_logs, vec!["hyper", "h2"]);
        assert_eq!(config.logging.loggers, vec!["worker"]);
        assert_eq!(config.request_logging.level, LogLevel::Debug);
        assert_eq!(config.request_logging.ignored_status_codes, vec![404, 401]);
        assert!(config.request_logging.include_request_in_failed_requests);
        assert!(!config.request_logging.include_response_in_failed_requests);
        assert_eq!(config.request_logging.max_body_bytes, 1024);
    }

    #[test]
    fn test_unknown_format_is_a_parse_error() {
        let err = parse_config("[logging]\nformat = \"yaml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config("[request_logging]\nignored_status_codes = [700]\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::InvalidStatusCode(700)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
