//! Background job subsystem.
//!
//! # Data Flow
//! ```text
//! Module load:
//!     LazyActor::new(fn, spec)          (no broker contact)
//!
//! Startup, once the broker is configured:
//!     LazyActor::init_actor(broker)
//!         → Actor::new (declares actor + queue on the broker)
//!
//! Dispatch:
//!     LazyActor::send(args)
//!         → Actor::message (uuid, queue, args as JSON)
//!         → Broker::enqueue
//! ```
//!
//! # Design Decisions
//! - Binding is one-way: unbound → bound, never rebound
//! - An unbound actor refuses broker work with `JobError::Unbound`
//! - `StubBroker` keeps messages in memory for tests and demos

pub mod actor;
pub mod broker;
pub mod lazy;
pub mod message;

pub use actor::{Actor, ActorFn, ActorSpec};
pub use broker::{Broker, BrokerError, StubBroker};
pub use lazy::{ActorState, LazyActor};
pub use message::Message;

/// Errors from actors and the jobs they run.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("actor {0} is not bound to a broker; call init_actor first")]
    Unbound(String),
    #[error("actor {0} is already bound to a broker")]
    AlreadyBound(String),
    #[error("invalid queue name {0:?}")]
    InvalidQueueName(String),
    #[error("failed to encode arguments: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("job failed: {0}")]
    Failed(String),
}
