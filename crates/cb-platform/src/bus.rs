use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use cb_core::ports::{EventHandler, HostEvent, HostEventPort, ListenerId};
use cb_core::TransportError;
use serde_json::Value;
use tracing::trace;

/// In-process publish/subscribe bus.
///
/// Handlers run synchronously on the publishing thread, in registration
/// order, and outside of the registry lock so they may subscribe or
/// unsubscribe themselves.
#[derive(Default)]
pub struct InMemoryEventBus {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, EventHandler)>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `payload` to every listener of `event`. Returns how many
    /// handlers were invoked.
    pub fn publish(&self, event: &str, payload: Value) -> usize {
        let handlers: Vec<EventHandler> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map(|entries| entries.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        trace!(event, listeners = handlers.len(), "publishing host event");
        for handler in &handlers {
            handler(HostEvent::new(event, payload.clone()));
        }
        handlers.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl HostEventPort for InMemoryEventBus {
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, TransportError> {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        for entries in listeners.values_mut() {
            entries.retain(|(existing, _)| *existing != id);
        }
        listeners.retain(|_, entries| !entries.is_empty());
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        self.publish(event, payload);
        Ok(())
    }
}
