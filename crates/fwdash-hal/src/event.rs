//! Per-service event streams with scoped subscriptions.
//!
//! An [`EventStream`] is a cheap, clonable handle to the callback hub of one
//! `(device, service index, event code)` triple. Every clone refers to the
//! same hub; [`EventStream::same_stream`] compares hub identity so callers can
//! tell whether a re-subscription is needed.
//!
//! [`EventStream::subscribe`] returns a [`Subscription`] guard. The handler
//! stays registered exactly as long as the guard is alive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::Utc;
use fwdash_types::{DeviceId, EventCode, ServiceEvent};
use tracing::trace;
use uuid::Uuid;

type Handler = Arc<dyn Fn(&ServiceEvent) + Send + Sync>;

struct Hub {
    device: DeviceId,
    service_index: usize,
    code: EventCode,
    next_token: AtomicU64,
    handlers: Mutex<Vec<(u64, Handler)>>,
}

/// Handle to the event hub of a single service event.
#[derive(Clone)]
pub struct EventStream {
    hub: Arc<Hub>,
}

impl EventStream {
    pub fn new(device: DeviceId, service_index: usize, code: EventCode) -> Self {
        Self {
            hub: Arc::new(Hub {
                device,
                service_index,
                code,
                next_token: AtomicU64::new(0),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn code(&self) -> EventCode {
        self.hub.code
    }

    /// `true` when both handles refer to the same hub.
    pub fn same_stream(&self, other: &EventStream) -> bool {
        Arc::ptr_eq(&self.hub, &other.hub)
    }

    /// Register `handler`; it is removed when the returned guard drops.
    pub fn subscribe(
        &self,
        handler: impl Fn(&ServiceEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let token = self.hub.next_token.fetch_add(1, Ordering::SeqCst);
        self.hub
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token, Arc::new(handler)));
        Subscription {
            hub: Arc::downgrade(&self.hub),
            token,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Report the event to every current subscriber.
    ///
    /// Handlers run outside the hub lock, so a handler may subscribe or drop
    /// subscriptions on the same stream.
    pub fn emit(&self) -> ServiceEvent {
        let event = ServiceEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            device: self.hub.device.clone(),
            service_index: self.hub.service_index,
            code: self.hub.code,
        };
        let handlers: Vec<Handler> = self
            .hub
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        trace!(
            device = %event.device,
            service_index = event.service_index,
            code = event.code.0,
            subscribers = handlers.len(),
            "event emitted"
        );
        for handler in handlers {
            handler(&event);
        }
        event
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("device", &self.hub.device)
            .field("service_index", &self.hub.service_index)
            .field("code", &self.hub.code)
            .finish()
    }
}

/// Keeps a handler registered on an [`EventStream`] until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    hub: Weak<Hub>,
    token: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(token, _)| *token != self.token);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .finish()
    }
}
