//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (status codes, body limits)
//! - Check logger names can become filter directives
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("status code {0} is not a valid HTTP status")]
    InvalidStatusCode(u16),
    #[error("{section}: logger name {name:?} is invalid")]
    InvalidLoggerName { section: &'static str, name: String },
    #[error("request_logging.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for code in &config.request_logging.ignored_status_codes {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::InvalidStatusCode(*code));
        }
    }

    if config.request_logging.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let named = [
        ("logging.loggers", &config.logging.loggers),
        ("logging.external_logs", &config.logging.external_logs),
    ];
    for (section, names) in named {
        for name in names {
            if !is_valid_logger_name(name) {
                errors.push(ValidationError::InvalidLoggerName {
                    section,
                    name: name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Logger names are tracing targets: identifier segments joined by `::`.
fn is_valid_logger_name(name: &str) -> bool {
    !name.is_empty()
        && name.split("::").all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}
