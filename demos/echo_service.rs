//! Small echo service wiring every piece together.
//!
//! ```text
//! cargo run --example echo_service -- -vv --format json
//! curl -X POST localhost:3000/echo -d 'hello'
//! ```

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde_json::{json, Value};
use service_tools::config::{load_config, ServiceConfig};
use service_tools::http::{request_logging_middleware, RequestLogger};
use service_tools::jobs::{ActorSpec, Broker, JobError, LazyActor, StubBroker};
use service_tools::observability::Timer;
use service_tools::{LogFormat, LoggingSetup, Verbosity};
use tokio::net::TcpListener;
use tracing::Level;

/// Declared before any broker exists.
static RECORD_ECHO: LazyLock<LazyActor> = LazyLock::new(|| {
    LazyActor::from_fn(
        ActorSpec::new("record_echo").queue_name("echoes"),
        |args: &Value| -> Result<(), JobError> {
            tracing::info!(args = %args, "Echo recorded");
            Ok(())
        },
    )
});

#[derive(Parser)]
#[command(name = "echo_service")]
#[command(about = "Echo service with request logging", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv everything)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Override the configured log format
    #[arg(long)]
    format: Option<LogFormat>,

    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: String,
}

#[derive(Clone)]
struct AppState {
    broker: Arc<StubBroker>,
}

async fn echo(State(state): State<AppState>, body: Bytes) -> Result<String, StatusCode> {
    let text = String::from_utf8_lossy(&body).into_owned();

    let reverse = Timer::new().level(Level::DEBUG).details(true).wrap("reverse", |s: &str| {
        s.chars().rev().collect::<String>()
    });
    let reversed = reverse.call(text.as_str());

    RECORD_ECHO
        .send(json!({ "text": text }))
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    tracing::debug!(queued = state.broker.queue_len("echoes"), "Echo queued");

    Ok(reversed)
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "this route always fails")
}

async fn boom() -> &'static str {
    panic!("boom")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose > 0 {
        logging.verbosity = Verbosity::from(cli.verbose);
    }
    if let Some(format) = cli.format {
        logging.format = format;
    }
    LoggingSetup::from_config(&logging).install()?;

    let broker = Arc::new(StubBroker::new());
    let shared: Arc<dyn Broker> = broker.clone();
    Timer::new().time("init_actor", || RECORD_ECHO.init_actor(shared))?;

    let request_logger = Arc::new(RequestLogger::from_config(&config.request_logging));
    let app = Router::new()
        .route("/echo", post(echo))
        .route("/fail", get(fail))
        .route("/boom", get(boom))
        .with_state(AppState { broker })
        .layer(middleware::from_fn_with_state(
            request_logger,
            request_logging_middleware,
        ));

    let listener = TcpListener::bind(&cli.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "Echo service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
