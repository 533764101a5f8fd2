//! Cross-cutting utilities for backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        SERVICE PROCESS                       │
//!   │                                                              │
//!   │  startup:  config ──▶ observability::logging ──▶ panic hook  │
//!   │                  └──▶ jobs::LazyActor::init_actor(broker)    │
//!   │                                                              │
//!   │  request:  axum ──▶ http::middleware ──▶ handler             │
//!   │                     (start / end / error events)             │
//!   │                                                              │
//!   │  anywhere: observability::Timer ──▶ "timing information"     │
//!   │                                                              │
//!   │  tests:    testing::LogCapture / relative_patch_maker        │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

// Configuration
pub mod config;

// Cross-cutting concerns
pub mod http;
pub mod jobs;
pub mod observability;

// Test support
pub mod testing;

pub use config::ServiceConfig;
pub use http::RequestLogger;
pub use jobs::{Actor, ActorSpec, Broker, JobError, LazyActor};
pub use observability::{default_logging, LogFormat, LoggingSetup, Timer, Verbosity};
