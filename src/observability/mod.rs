//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Process start:
//!     → verbosity.rs (ordinal → tracing Level)
//!     → logging.rs (filter table + output layer, installed globally)
//!         → format.rs (text rendering) or tracing-subscriber JSON
//!     → panic_hook.rs (uncaught panics → "Uncaught exception" event)
//!
//! At runtime:
//!     → timer.rs (wall-clock timing events around calls)
//!     → http::middleware (request start/end/error events)
//! ```
//!
//! # Design Decisions
//! - Configuration is an explicit call, never a load-time side effect
//! - Reconfiguration swaps reload layers in place (last call wins)
//! - Event severity is chosen at runtime through [`log_at!`]

pub mod format;
pub mod logging;
pub mod panic_hook;
pub mod timer;
pub mod verbosity;

pub use format::{LogFormat, TextFormat};
pub use logging::{build_loggers_dictionary, default_logging, LoggerConfig, LoggingError, LoggingSetup};
pub use timer::{Timed, Timer};
pub use verbosity::Verbosity;

/// Emit a tracing event at a level only known at runtime.
///
/// `tracing::event!` needs a constant level, so this dispatches to the
/// matching macro.
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: ::tracing::Level = $level;
        match level {
            ::tracing::Level::ERROR => ::tracing::error!($($arg)+),
            ::tracing::Level::WARN => ::tracing::warn!($($arg)+),
            ::tracing::Level::INFO => ::tracing::info!($($arg)+),
            ::tracing::Level::DEBUG => ::tracing::debug!($($arg)+),
            // `Level` has five values; only TRACE is left.
            _ => ::tracing::trace!($($arg)+),
        }
    }};
}

pub(crate) use log_at;
