use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// A named, structured message delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub name: String,
    pub payload: Value,
}

impl HostEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Listener callback. May be invoked from any thread.
pub type EventHandler = Arc<dyn Fn(HostEvent) + Send + Sync>;

/// Publish/subscribe channel of the host.
///
/// Delivery is at-least-once; ordering is only guaranteed per event name.
#[async_trait]
pub trait HostEventPort: Send + Sync {
    /// Register `handler` for `event`.
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, TransportError>;

    /// Detach a listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);

    /// Publish `payload` under `event`.
    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError>;
}
