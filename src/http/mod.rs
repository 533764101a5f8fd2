//! HTTP integration.
//!
//! # Data Flow
//! ```text
//! axum Router
//!     → middleware::request_logging (start event, body buffering)
//!     → handler (panics caught and turned into 500)
//!     → middleware::request_logging (end event, error event)
//!     → response to client
//! ```

pub mod middleware;

pub use middleware::{request_logging_middleware, RequestLogger};
