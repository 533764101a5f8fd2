//! Request logging middleware.
//!
//! Logs to tracing at the start and completion of each request. A handler
//! that panics is logged and converted to a 500 response. Failure responses
//! (400s and 500s) are logged again unless their status is ignored, for
//! example to stay quiet about every 404.
//!
//! # Events (all at the configured level)
//! - `HTTP request start`: method, path
//! - `Exception Occurred`: error, [panic.location], [backtrace] (handler panicked)
//! - `HTTP request end`: method, path, status_code, seconds
//! - `HTTP request error`: method, path, status_code, [request], [content]
//!
//! Bodies are captured for the error event only up to `max_body_bytes`.
//! Larger bodies pass through unchanged and are left out of the event.

use std::collections::HashSet;
use std::future::{poll_fn, Future};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{stream, FutureExt, StreamExt};
use serde_json::json;
use tracing::Level;

use crate::config::RequestLoggingConfig;
use crate::observability::log_at;
use crate::observability::panic_hook::{self, payload_message, CaughtPanic};

const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Request logging settings, shared by every request.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    level: Level,
    ignored_status_codes: HashSet<u16>,
    include_request_in_failed_requests: bool,
    include_response_in_failed_requests: bool,
    max_body_bytes: usize,
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            ignored_status_codes: HashSet::new(),
            include_request_in_failed_requests: false,
            include_response_in_failed_requests: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RequestLoggingConfig) -> Self {
        Self::new()
            .level(config.level.into())
            .ignored_status_codes(config.ignored_status_codes.iter().copied())
            .include_request_in_failed_requests(config.include_request_in_failed_requests)
            .include_response_in_failed_requests(config.include_response_in_failed_requests)
            .max_body_bytes(config.max_body_bytes)
    }

    /// Level all request events are written at.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Status codes that never produce an error event.
    pub fn ignored_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.ignored_status_codes.extend(codes);
        self
    }

    /// Buffer the request body and attach it to error events.
    pub fn include_request_in_failed_requests(mut self, include: bool) -> Self {
        self.include_request_in_failed_requests = include;
        self
    }

    /// Attach the response body to error events.
    pub fn include_response_in_failed_requests(mut self, include: bool) -> Self {
        self.include_response_in_failed_requests = include;
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    fn is_reported(&self, status: StatusCode) -> bool {
        status.as_u16() >= 400 && !self.ignored_status_codes.contains(&status.as_u16())
    }

    /// Log information about the request and call the next layer.
    pub async fn dispatch<F, Fut>(&self, request: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let method = request.method().to_string();
        let path = request.uri().path().to_string();

        log_at!(self.level, method = %method, path = %path, "HTTP request start");
        let start_time = Instant::now();

        let (request, request_body) = if self.include_request_in_failed_requests {
            let (parts, body) = request.into_parts();
            let (body, captured) = capture_body(body, self.max_body_bytes).await;
            (Request::from_parts(parts, body), captured)
        } else {
            (request, None)
        };
        let response = self.call_next(request, next).await;

        let duration = start_time.elapsed().as_secs_f64();
        let status = response.status();
        log_at!(
            self.level,
            method = %method,
            path = %path,
            status_code = status.as_u16(),
            seconds = duration,
            "HTTP request end"
        );

        if !self.is_reported(status) {
            return response;
        }

        let (response, response_body) = if self.include_response_in_failed_requests {
            let (parts, body) = response.into_parts();
            let (body, captured) = capture_body(body, self.max_body_bytes).await;
            (Response::from_parts(parts, body), captured)
        } else {
            (response, None)
        };

        let request_text = request_body.as_ref().map(|b| String::from_utf8_lossy(b));
        let content = response_body.as_ref().map(|b| String::from_utf8_lossy(b));
        match (request_text, content) {
            (Some(request), Some(content)) => log_at!(
                self.level,
                method = %method,
                path = %path,
                status_code = status.as_u16(),
                request = %request,
                content = %content,
                "HTTP request error"
            ),
            (Some(request), None) => log_at!(
                self.level,
                method = %method,
                path = %path,
                status_code = status.as_u16(),
                request = %request,
                "HTTP request error"
            ),
            (None, Some(content)) => log_at!(
                self.level,
                method = %method,
                path = %path,
                status_code = status.as_u16(),
                content = %content,
                "HTTP request error"
            ),
            (None, None) => log_at!(
                self.level,
                method = %method,
                path = %path,
                status_code = status.as_u16(),
                "HTTP request error"
            ),
        }

        response
    }

    async fn call_next<F, Fut>(&self, request: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let mut handler = Box::pin(next(request));
        let outcome = AssertUnwindSafe(poll_fn(move |cx| {
            let _catching = panic_hook::catching();
            handler.as_mut().poll(cx)
        }))
        .catch_unwind()
        .await;

        match outcome {
            Ok(response) => response,
            Err(panic) => {
                let error = payload_message(panic.as_ref()).to_string();
                match panic_hook::take_caught() {
                    Some(CaughtPanic {
                        location,
                        backtrace: Some(backtrace),
                    }) => log_at!(
                        self.level,
                        error = %error,
                        panic.location = %location,
                        backtrace = %backtrace,
                        "Exception Occurred"
                    ),
                    Some(CaughtPanic { location, .. }) => log_at!(
                        self.level,
                        error = %error,
                        panic.location = %location,
                        "Exception Occurred"
                    ),
                    None => log_at!(self.level, error = %error, "Exception Occurred"),
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error })),
                )
                    .into_response()
            }
        }
    }
}

/// Read up to `limit` bytes of `body` for logging.
///
/// The returned body always yields the full original stream. The captured
/// bytes are `None` when the body is larger than `limit` or fails mid-way.
async fn capture_body(body: Body, limit: usize) -> (Body, Option<Bytes>) {
    let mut stream = body.into_data_stream();
    let mut collected = Vec::new();

    loop {
        match stream.next().await {
            None => {
                let bytes = Bytes::from(collected);
                return (Body::from(bytes.clone()), Some(bytes));
            }
            Some(Ok(chunk)) if collected.len() + chunk.len() <= limit => {
                collected.extend_from_slice(&chunk);
            }
            Some(next) => {
                let head = stream::iter([Ok(Bytes::from(collected)), next]);
                return (Body::from_stream(head.chain(stream)), None);
            }
        }
    }
}

/// Axum entry point, for `axum::middleware::from_fn_with_state`.
pub async fn request_logging_middleware(
    State(logger): State<Arc<RequestLogger>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    logger.dispatch(request, |request| next.run(request)).await
}
