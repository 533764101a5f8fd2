//! Request logging through a real axum router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use service_tools::http::RequestLogger;
use service_tools::testing::relative_patch_maker;
use tower::ServiceExt;

mod common;

fn patch(relative: &str) -> service_tools::testing::LogPatch {
    relative_patch_maker("service_tools")(relative)
}

#[tokio::test]
async fn test_successful_request_logs_start_and_end() {
    let capture = patch("http::middleware").start();
    let app = common::test_router(RequestLogger::new());

    let response = app
        .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(capture.messages(), vec!["HTTP request start", "HTTP request end"]);
    assert_eq!(capture.events()[1].field("path"), Some("/ok"));
}

#[tokio::test]
async fn test_not_found_logs_error_event() {
    let capture = patch("http::middleware").start();
    let app = common::test_router(RequestLogger::new());

    let response = app
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let events = capture.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].message, "HTTP request error");
    assert_eq!(events[2].field("status_code"), Some("404"));
}

#[tokio::test]
async fn test_ignored_not_found_is_quiet() {
    let capture = patch("http::middleware").start();
    let app = common::test_router(RequestLogger::new().ignored_status_codes([404]));

    app.oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(capture.len(), 2);
}

#[tokio::test]
async fn test_failed_request_body_reaches_handler_and_log() {
    let capture = patch("http::middleware").start();
    let app = common::test_router(
        RequestLogger::new()
            .include_request_in_failed_requests(true)
            .include_response_in_failed_requests(true),
    );

    let response = app
        .oneshot(
            Request::post("/reject")
                .body(Body::from(r#"{"name":"widget"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"rejected 17 bytes");

    let error = &capture.events()[2];
    assert_eq!(error.field("request"), Some(r#"{"name":"widget"}"#));
    assert_eq!(error.field("content"), Some("rejected 17 bytes"));
}

#[tokio::test]
async fn test_live_server_converts_panics() {
    let capture = patch("http::middleware").start();
    let addr = common::start_server(common::test_router(RequestLogger::new())).await;

    let (status, body) = common::raw_request(addr, "GET", "/panic", "").await;

    assert_eq!(status, 500);
    assert!(body.contains(r#"{"error":"handler exploded"}"#), "got: {body}");
    assert_eq!(
        capture.messages(),
        vec![
            "HTTP request start",
            "Exception Occurred",
            "HTTP request end",
            "HTTP request error",
        ]
    );

    let (status, _) = common::raw_request(addr, "GET", "/ok", "").await;
    assert_eq!(status, 200);
    assert_eq!(capture.len(), 6);
}
