// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Event Stream - Pub/Sub bridge from the collaboration hub to observers
//
// Subscribed to the hub like any other listener, it republishes every event
// on a tokio broadcast channel so SSE endpoints and CLI observers can follow
// the workflow in real time.
//
// In-memory only: events published while nobody is subscribed are dropped.

use crate::domain::events::CollaborationEvent;
use crate::infrastructure::collaboration_hub::{CollaborationListener, ListenerError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Fan-out channel for collaboration events
#[derive(Clone)]
pub struct EventStreamListener {
    sender: Arc<broadcast::Sender<CollaborationEvent>>,
}

impl EventStreamListener {
    /// Capacity is how many events a slow subscriber may fall behind before
    /// it starts losing the oldest ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventStreamListener {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl CollaborationListener for EventStreamListener {
    async fn notify(&self, event: &CollaborationEvent) -> Result<(), ListenerError> {
        // send() only fails when there are no receivers
        if self.sender.send(event.clone()).is_err() {
            debug!("No stream subscribers for '{}' event", event.event_type);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "event-stream"
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<CollaborationEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<CollaborationEvent, EventStreamError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventStreamError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventStreamError::Lagged(n)
            }
        })
    }

    pub fn try_recv(&mut self) -> Result<CollaborationEvent, EventStreamError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventStreamError::Empty,
            broadcast::error::TryRecvError::Closed => EventStreamError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventStreamError::Lagged(n)
            }
        })
    }

    pub fn into_stream(self) -> BroadcastStream<CollaborationEvent> {
        BroadcastStream::new(self.receiver)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventStreamError {
    #[error("Event stream is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::collaboration_hub::CollaborationHub;
    use serde_json::json;

    #[tokio::test]
    async fn test_hub_events_reach_stream_subscribers() {
        let hub = CollaborationHub::new();
        let stream = EventStreamListener::new(16);
        hub.subscribe(Arc::new(stream.clone()));

        let mut receiver = stream.subscribe();
        hub.broadcast("user_query", json!({"query": "hi"})).await;

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, "user_query");
        assert_eq!(event.str_field("query"), Some("hi"));
    }

    #[test]
    fn test_subscriber_count_follows_receivers() {
        let stream = EventStreamListener::new(4);
        assert_eq!(stream.subscriber_count(), 0);

        let first = stream.subscribe();
        let second = stream.subscribe();
        assert_eq!(stream.subscriber_count(), 2);

        drop(first);
        assert_eq!(stream.subscriber_count(), 1);
        drop(second);
        assert_eq!(stream.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_no_subscribers_is_not_a_failure() {
        let hub = CollaborationHub::new();
        hub.subscribe(Arc::new(EventStreamListener::new(4)));

        let report = hub.broadcast("user_query", json!({})).await;
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_try_recv_on_empty() {
        let stream = EventStreamListener::new(4);
        let mut receiver = stream.subscribe();
        assert!(matches!(receiver.try_recv(), Err(EventStreamError::Empty)));
    }

    #[tokio::test]
    async fn test_slow_receiver_reports_lag() {
        let stream = EventStreamListener::new(2);
        let mut receiver = stream.subscribe();

        for i in 0..5 {
            let event = CollaborationEvent::new("tick", json!({"i": i}));
            stream.notify(&event).await.unwrap();
        }

        assert!(matches!(receiver.recv().await, Err(EventStreamError::Lagged(3))));
        assert_eq!(receiver.recv().await.unwrap().payload["i"], 3);
    }
}
