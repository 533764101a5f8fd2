//! Broker seam.
//!
//! Real brokers live outside this crate; they implement [`Broker`].
//! [`StubBroker`] keeps everything in memory.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::jobs::actor::ActorSpec;
use crate::jobs::message::Message;

/// Errors reported by a broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("queue {0:?} not found")]
    QueueNotFound(String),
    #[error("broker connection failed: {0}")]
    Connection(String),
    #[error("broker state lock poisoned")]
    Poisoned,
}

/// What an actor needs from a message broker.
pub trait Broker: Send + Sync {
    /// Register an actor, declaring its queue if needed.
    fn declare_actor(&self, spec: &ActorSpec) -> Result<(), BrokerError>;

    /// Put a message on its queue.
    fn enqueue(&self, message: Message) -> Result<Message, BrokerError>;
}

#[derive(Default)]
struct StubState {
    queues: HashMap<String, VecDeque<Message>>,
    actors: HashMap<String, ActorSpec>,
}

/// In-memory broker.
#[derive(Default)]
pub struct StubBroker {
    state: Mutex<StubState>,
}

impl StubBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StubState>, BrokerError> {
        self.state.lock().map_err(|_| BrokerError::Poisoned)
    }

    pub fn declare_queue(&self, queue_name: &str) -> Result<(), BrokerError> {
        let mut state = self.state()?;
        if !state.queues.contains_key(queue_name) {
            state.queues.insert(queue_name.to_string(), VecDeque::new());
            tracing::debug!(queue = %queue_name, "Queue declared");
        }
        Ok(())
    }

    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state()
            .map(|s| s.queues.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn actor(&self, actor_name: &str) -> Option<ActorSpec> {
        self.state().ok()?.actors.get(actor_name).cloned()
    }

    pub fn queue_len(&self, queue_name: &str) -> usize {
        self.state()
            .ok()
            .and_then(|s| s.queues.get(queue_name).map(VecDeque::len))
            .unwrap_or(0)
    }

    /// Remove and return every message on a queue, oldest first.
    pub fn drain(&self, queue_name: &str) -> Result<Vec<Message>, BrokerError> {
        let mut state = self.state()?;
        let queue = state
            .queues
            .get_mut(queue_name)
            .ok_or_else(|| BrokerError::QueueNotFound(queue_name.to_string()))?;
        Ok(queue.drain(..).collect())
    }
}

impl Broker for StubBroker {
    fn declare_actor(&self, spec: &ActorSpec) -> Result<(), BrokerError> {
        self.declare_queue(&spec.queue_name)?;
        self.state()?
            .actors
            .insert(spec.actor_name.clone(), spec.clone());
        Ok(())
    }

    fn enqueue(&self, message: Message) -> Result<Message, BrokerError> {
        let mut state = self.state()?;
        let queue = state
            .queues
            .get_mut(&message.queue_name)
            .ok_or_else(|| BrokerError::QueueNotFound(message.queue_name.clone()))?;
        queue.push_back(message.clone());
        tracing::debug!(
            queue = %message.queue_name,
            actor = %message.actor_name,
            message_id = %message.message_id,
            "Message enqueued"
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_enqueue_requires_declared_queue() {
        let broker = StubBroker::new();
        let message = Message::new("missing", "job", json!(null), Map::new());

        let err = broker.enqueue(message).unwrap_err();
        assert!(matches!(err, BrokerError::QueueNotFound(q) if q == "missing"));
    }

    #[test]
    fn test_declare_actor_declares_queue() {
        let broker = StubBroker::new();
        let spec = ActorSpec::new("send_email").queue_name("emails");

        broker.declare_actor(&spec).unwrap();

        assert_eq!(broker.queue_names(), vec!["emails"]);
        assert_eq!(broker.actor("send_email"), Some(spec));
    }

    #[test]
    fn test_drain_is_fifo() {
        let broker = StubBroker::new();
        broker.declare_queue("default").unwrap();
        for i in 0..3 {
            broker
                .enqueue(Message::new("default", "count", json!(i), Map::new()))
                .unwrap();
        }

        assert_eq!(broker.queue_len("default"), 3);
        let args: Vec<_> = broker.drain("default").unwrap().into_iter().map(|m| m.args).collect();
        assert_eq!(args, vec![json!(0), json!(1), json!(2)]);
        assert_eq!(broker.queue_len("default"), 0);
    }
}
