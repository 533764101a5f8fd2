//! Actors bound to a broker.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::jobs::broker::Broker;
use crate::jobs::message::Message;
use crate::jobs::JobError;

/// The function an actor runs for each message.
pub type ActorFn = Arc<dyn Fn(&Value) -> Result<(), JobError> + Send + Sync>;

pub const DEFAULT_QUEUE_NAME: &str = "default";

/// Everything about an actor except its function and broker.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSpec {
    pub actor_name: String,
    pub queue_name: String,
    pub priority: i32,
    pub options: Map<String, Value>,
}

impl ActorSpec {
    pub fn new(actor_name: impl Into<String>) -> Self {
        Self {
            actor_name: actor_name.into(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            priority: 0,
            options: Map::new(),
        }
    }

    pub fn queue_name(mut self, queue_name: impl Into<String>) -> Self {
        self.queue_name = queue_name.into();
        self
    }

    /// Lower values are processed first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn options(mut self, options: Map<String, Value>) -> Self {
        self.options.extend(options);
        self
    }
}

/// Queue names: a letter or underscore, then letters, digits, `.`, `_`, `-`.
pub fn is_valid_queue_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// An actor declared on a broker, ready to send messages.
#[derive(Clone)]
pub struct Actor {
    spec: ActorSpec,
    func: ActorFn,
    broker: Arc<dyn Broker>,
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor").field("spec", &self.spec).finish_non_exhaustive()
    }
}

impl Actor {
    /// Create an actor and declare it on `broker`.
    pub fn new(func: ActorFn, spec: ActorSpec, broker: Arc<dyn Broker>) -> Result<Self, JobError> {
        if !is_valid_queue_name(&spec.queue_name) {
            return Err(JobError::InvalidQueueName(spec.queue_name));
        }
        broker.declare_actor(&spec)?;

        tracing::debug!(
            actor = %spec.actor_name,
            queue = %spec.queue_name,
            priority = spec.priority,
            "Actor declared"
        );
        Ok(Self { spec, func, broker })
    }

    pub fn actor_name(&self) -> &str {
        &self.spec.actor_name
    }

    pub fn queue_name(&self) -> &str {
        &self.spec.queue_name
    }

    pub fn priority(&self) -> i32 {
        self.spec.priority
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.spec.options
    }

    pub fn spec(&self) -> &ActorSpec {
        &self.spec
    }

    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.broker
    }

    /// Build a message for this actor without sending it.
    pub fn message<A: Serialize>(&self, args: A) -> Result<Message, JobError> {
        self.message_with_options(args, Map::new())
    }

    /// Build a message whose options extend the actor's own.
    pub fn message_with_options<A: Serialize>(
        &self,
        args: A,
        options: Map<String, Value>,
    ) -> Result<Message, JobError> {
        let args = serde_json::to_value(args)?;
        let mut merged = self.spec.options.clone();
        merged.extend(options);
        Ok(Message::new(
            self.spec.queue_name.clone(),
            self.spec.actor_name.clone(),
            args,
            merged,
        ))
    }

    /// Send a message asking for this actor to run.
    pub fn send<A: Serialize>(&self, args: A) -> Result<Message, JobError> {
        self.send_with_options(args, Map::new())
    }

    pub fn send_with_options<A: Serialize>(
        &self,
        args: A,
        options: Map<String, Value>,
    ) -> Result<Message, JobError> {
        let message = self.message_with_options(args, options)?;
        Ok(self.broker.enqueue(message)?)
    }

    /// Run the actor's function synchronously.
    pub fn call(&self, args: &Value) -> Result<(), JobError> {
        (self.func)(args)
    }
}
