//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use service_tools::http::{request_logging_middleware, RequestLogger};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Router with one route per interesting outcome, wrapped in request logging.
pub fn test_router(logger: RequestLogger) -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nothing here") }))
        .route(
            "/reject",
            post(|body: Bytes| async move {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("rejected {} bytes", body.len()))
            }),
        )
        .route("/panic", get(panicking_handler))
        .layer(middleware::from_fn_with_state(
            Arc::new(logger),
            request_logging_middleware,
        ))
}

async fn panicking_handler() -> &'static str {
    panic!("handler exploded")
}

/// Serve `router` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Send a bare HTTP/1.1 request and return the status code and body.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String) {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw).into_owned();

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}
