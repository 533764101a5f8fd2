//! Job messages as they travel through a broker.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A request to run an actor with some arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub queue_name: String,
    pub actor_name: String,
    pub args: Value,
    #[serde(default)]
    pub options: Map<String, Value>,
    /// Milliseconds since the Unix epoch.
    pub message_timestamp: u64,
}

impl Message {
    pub fn new(
        queue_name: impl Into<String>,
        actor_name: impl Into<String>,
        args: Value,
        options: Map<String, Value>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            queue_name: queue_name.into(),
            actor_name: actor_name.into(),
            args,
            options,
            message_timestamp: now_millis(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_messages_get_distinct_ids() {
        let a = Message::new("default", "greet", json!(["alice"]), Map::new());
        let b = Message::new("default", "greet", json!(["alice"]), Map::new());
        assert_ne!(a.message_id, b.message_id);
        assert!(a.message_timestamp > 0);
    }

    #[test]
    fn test_decode_without_options() {
        let raw = br#"{
            "message_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "queue_name": "emails",
            "actor_name": "send_email",
            "args": {"to": "a@example.com"},
            "message_timestamp": 1700000000000
        }"#;
        let message = Message::decode(raw).unwrap();
        assert_eq!(message.queue_name, "emails");
        assert!(message.options.is_empty());
        assert_eq!(message.args["to"], "a@example.com");
    }
}
