//! Middleware pluggable into an axum middleware chain.

pub mod request_logging;

pub use request_logging::{request_logging_middleware, RequestLogger};
