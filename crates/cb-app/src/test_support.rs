//! Test doubles for the host ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cb_core::ports::{EventHandler, HostCommandPort, HostEvent, HostEventPort, ListenerId};
use cb_core::TransportError;
use mockall::mock;
use serde_json::Value;

mock! {
    pub Commands {}

    #[async_trait]
    impl HostCommandPort for Commands {
        async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError>;
    }
}

/// Event port that records emitted events and lets tests deliver host events
/// to registered listeners.
#[derive(Default)]
pub struct RecordingEvents {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, (String, EventHandler)>>,
    emitted: Mutex<Vec<HostEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver `payload` to every listener of `event`, synchronously.
    pub fn deliver(&self, event: &str, payload: Value) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .unwrap()
            .values()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(HostEvent::new(event, payload.clone()));
        }
    }

    pub fn emitted(&self) -> Vec<HostEvent> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn emitted_names(&self) -> Vec<String> {
        self.emitted().into_iter().map(|e| e.name).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[async_trait]
impl HostEventPort for RecordingEvents {
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, TransportError> {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .unwrap()
            .insert(id, (event.to_string(), handler));
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id);
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        self.emitted
            .lock()
            .unwrap()
            .push(HostEvent::new(event, payload));
        Ok(())
    }
}
