// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Events
//!
//! Collaboration events broadcast to every registered listener while a
//! query moves through the clarification workflow.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Event envelope and event type catalogue

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const USER_QUERY: &str = "user_query";
pub const CLARIFYING_QUESTION: &str = "clarifying_question";
pub const CLARIFICATION_ANSWER: &str = "clarification_answer";
pub const CLARIFICATIONS_COMPLETE: &str = "clarifications_complete";
pub const ASSISTANT_RESPONSE: &str = "assistant_response";
pub const PARTNER_RESPONSE: &str = "partner_response";

/// Transient event envelope. Listeners receive a shared reference and must
/// not assume exclusive access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationEvent {
    pub event_type: String,
    pub payload: Map<String, Value>,
}

impl CollaborationEvent {
    /// Build an event. A non-object payload is wrapped as `{"value": ...}`.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    /// String payload field, if present
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_payload_is_kept() {
        let event = CollaborationEvent::new(USER_QUERY, json!({"query": "Build a web app"}));
        assert!(event.is(USER_QUERY));
        assert_eq!(event.str_field("query"), Some("Build a web app"));
    }

    #[test]
    fn test_scalar_payload_is_wrapped() {
        let event = CollaborationEvent::new("ping", json!(3));
        assert_eq!(event.payload.get("value"), Some(&json!(3)));

        let event = CollaborationEvent::new("ping", Value::Null);
        assert!(event.payload.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_envelope() {
        let event = CollaborationEvent::new(CLARIFICATIONS_COMPLETE, json!({"count": 3}));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event_type": "clarifications_complete", "payload": {"count": 3}})
        );
    }
}
