use std::sync::Arc;

use cb_core::ports::HostEventPort;
use cb_core::{BridgeError, ListenSelection};
use tracing::{info, info_span, Instrument};

use super::{ClipboardChangeDispatcher, Subscription};
use crate::facade::ClipboardClient;

/// Starts and stops the host's native clipboard monitor.
///
/// ## Behavior / 行为
///
/// - `start` and `stop` are idempotent from the caller's view; the host
///   answers a second start or stop without error.
/// - `start_listening` composes start with a dispatcher subscription and
///   hands back a single teardown.
pub struct MonitorLifecycle {
    client: ClipboardClient,
    events: Arc<dyn HostEventPort>,
}

impl MonitorLifecycle {
    pub fn new(client: ClipboardClient, events: Arc<dyn HostEventPort>) -> Self {
        Self { client, events }
    }

    pub async fn start(&self) -> Result<(), BridgeError> {
        let span = info_span!("usecase.monitor_lifecycle.start");

        async {
            self.client.start_monitor().await?;
            info!("Clipboard monitor started");
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn stop(&self) -> Result<(), BridgeError> {
        let span = info_span!("usecase.monitor_lifecycle.stop");

        async {
            self.client.stop_monitor().await?;
            info!("Clipboard monitor stopped");
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn is_running(&self) -> Result<bool, BridgeError> {
        self.client.is_monitor_running().await
    }

    /// Start the monitor and attach a dispatcher for `selection`.
    ///
    /// If attaching fails the monitor is left running; the caller still owns
    /// stopping it.
    pub async fn start_listening(
        &self,
        selection: ListenSelection,
    ) -> Result<ListeningSession, BridgeError> {
        let span = info_span!("usecase.monitor_lifecycle.start_listening", ?selection);

        async {
            self.start().await?;
            let dispatcher = ClipboardChangeDispatcher::new(self.client.clone(), self.events.clone());
            let subscription = dispatcher.listen(selection).await?;
            Ok(ListeningSession {
                subscription,
                client: self.client.clone(),
            })
        }
        .instrument(span)
        .await
    }
}

/// A running monitor plus its dispatcher subscription.
#[derive(Debug)]
pub struct ListeningSession {
    subscription: Subscription,
    client: ClipboardClient,
}

impl ListeningSession {
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Detach the dispatcher, then stop the monitor.
    ///
    /// The dispatcher is always detached; a failing stop is returned.
    pub async fn stop(self) -> Result<(), BridgeError> {
        self.subscription.unsubscribe();
        self.client.stop_monitor().await?;
        info!("Clipboard listening session stopped");
        Ok(())
    }
}
