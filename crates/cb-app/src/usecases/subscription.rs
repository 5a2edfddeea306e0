use std::fmt;
use std::sync::Arc;

use cb_core::ports::{HostEventPort, ListenerId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle returned by every listening operation.
///
/// Dropping the handle does not detach the listener; call
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    id: ListenerId,
    events: Arc<dyn HostEventPort>,
    token: Option<CancellationToken>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, events: Arc<dyn HostEventPort>) -> Self {
        Self {
            id,
            events,
            token: None,
        }
    }

    /// Attach a token cancelled on unsubscribe, for work spawned by the listener.
    pub(crate) fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// False once in-flight work of this subscription has been told to stop.
    pub fn is_active(&self) -> bool {
        self.token.as_ref().map_or(true, |t| !t.is_cancelled())
    }

    /// Detach from the host channel.
    ///
    /// In-flight work is cancelled first, so no event is emitted on behalf of
    /// this subscription once this returns.
    pub fn unsubscribe(self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
        self.events.unlisten(self.id);
        debug!(listener = %self.id, "unsubscribed");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
