// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Collaboration Hub - In-process fan-out of collaboration events
//
// Listeners are awaited one after another in subscription order. A listener
// that fails or panics is logged and skipped; the remaining listeners still
// receive the event and the publisher never sees the failure.

use crate::domain::events::CollaborationEvent;
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Failure reported by a listener. Never propagated past the hub.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives every broadcast collaboration event
#[async_trait]
pub trait CollaborationListener: Send + Sync {
    async fn notify(&self, event: &CollaborationEvent) -> Result<(), ListenerError>;

    /// Name used in delivery-failure logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapts a blocking closure into a listener
pub struct FnListener<F> {
    f: F,
}

impl<F> FnListener<F>
where
    F: Fn(&CollaborationEvent) -> Result<(), ListenerError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> CollaborationListener for FnListener<F>
where
    F: Fn(&CollaborationEvent) -> Result<(), ListenerError> + Send + Sync,
{
    async fn notify(&self, event: &CollaborationEvent) -> Result<(), ListenerError> {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        "fn-listener"
    }
}

/// Adapts a closure returning a future into a listener. The closure gets an
/// owned copy of the event.
pub struct AsyncFnListener<F> {
    f: F,
}

impl<F> AsyncFnListener<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> CollaborationListener for AsyncFnListener<F>
where
    F: Fn(CollaborationEvent) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    async fn notify(&self, event: &CollaborationEvent) -> Result<(), ListenerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        "async-fn-listener"
    }
}

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct CollaborationHub {
    listeners: RwLock<Vec<Arc<dyn CollaborationListener>>>,
}

impl CollaborationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The same listener may be registered twice and
    /// will then be notified twice.
    pub fn subscribe(&self, listener: Arc<dyn CollaborationListener>) {
        debug!("Subscribing collaboration listener: {}", listener.name());
        self.listeners.write().push(listener);
    }

    pub fn subscribe_fn<F>(&self, f: F)
    where
        F: Fn(&CollaborationEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnListener::new(f)));
    }

    pub fn subscribe_async<F, Fut>(&self, f: F)
    where
        F: Fn(CollaborationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        self.subscribe(Arc::new(AsyncFnListener::new(f)));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Build an event and deliver it to every current listener
    pub async fn broadcast(&self, event_type: &str, payload: Value) -> BroadcastReport {
        let event = CollaborationEvent::new(event_type, payload);
        self.broadcast_event(&event).await
    }

    pub async fn broadcast_event(&self, event: &CollaborationEvent) -> BroadcastReport {
        // Listeners subscribed during delivery only see later events
        let listeners: Vec<Arc<dyn CollaborationListener>> = self.listeners.read().clone();
        let mut report = BroadcastReport::default();

        for listener in listeners {
            match AssertUnwindSafe(listener.notify(event)).catch_unwind().await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(
                        "Listener '{}' failed on '{}' event: {}",
                        listener.name(),
                        event.event_type,
                        e
                    );
                    report.failed += 1;
                }
                Err(panic) => {
                    warn!(
                        "Listener '{}' panicked on '{}' event: {}",
                        listener.name(),
                        event.event_type,
                        panic_message(panic.as_ref())
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Broadcast '{}': {} delivered, {} failed",
            event.event_type, report.delivered, report.failed
        );
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
