//! Interval polling monitors for text and images.
//!
//! Superseded by the host monitor plus [`ClipboardChangeDispatcher`], but
//! kept for hosts that cannot push change notifications.
//!
//! [`ClipboardChangeDispatcher`]: super::ClipboardChangeDispatcher

use std::sync::Arc;
use std::time::Duration;

use cb_core::ports::HostEventPort;
use cb_core::protocol::events;
use cb_core::{BridgeError, ChangePayload, PollConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::facade::ClipboardClient;

/// What a monitor polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// `read_text`, emitted as text-changed.
    Text,
    /// `read_image_base64`, emitted as image-changed.
    Image,
}

impl PollTarget {
    pub fn default_delay(&self) -> Duration {
        match self {
            PollTarget::Text => Duration::from_millis(500),
            PollTarget::Image => Duration::from_millis(1000),
        }
    }

    pub fn delay_from(&self, config: &PollConfig) -> Duration {
        match self {
            PollTarget::Text => config.text_delay(),
            PollTarget::Image => config.image_delay(),
        }
    }

    pub fn event(&self) -> &'static str {
        match self {
            PollTarget::Text => events::TEXT_CHANGED,
            PollTarget::Image => events::IMAGE_CHANGED,
        }
    }

    async fn read(&self, client: &ClipboardClient) -> Result<String, BridgeError> {
        match self {
            PollTarget::Text => client.read_text().await,
            PollTarget::Image => client.read_image_base64().await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Stopped,
}

/// One polling monitor instance.
///
/// State machine `Idle -> Polling -> Stopped`; a stopped monitor cannot be
/// restarted. Stop takes effect at the next tick boundary, so at most one
/// more read may happen after [`PollMonitor::stop`]. Nothing is emitted
/// after stop returns.
pub struct PollMonitor {
    target: PollTarget,
    delay: Duration,
    client: ClipboardClient,
    events: Arc<dyn HostEventPort>,
    state: PollState,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollMonitor {
    pub fn new(target: PollTarget, client: ClipboardClient, events: Arc<dyn HostEventPort>) -> Self {
        Self {
            target,
            delay: target.default_delay(),
            client,
            events,
            state: PollState::Idle,
            token: CancellationToken::new(),
            task: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn target(&self) -> PollTarget {
        self.target
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Begin polling. Calling it again while polling, or after stop, does nothing.
    pub fn start(&mut self) {
        if self.state != PollState::Idle {
            debug!(target_kind = ?self.target, state = ?self.state, "poll monitor not idle, start ignored");
            return;
        }
        self.state = PollState::Polling;

        let worker = PollWorker {
            target: self.target,
            delay: self.delay,
            client: self.client.clone(),
            events: self.events.clone(),
            token: self.token.clone(),
            last_observed: String::new(),
        };
        let span = info_span!("usecase.poll_monitor", target_kind = ?self.target);
        self.task = Some(tokio::spawn(worker.run().instrument(span)));
        info!(target_kind = ?self.target, delay_ms = self.delay.as_millis() as u64, "Poll monitor started");
    }

    pub fn stop(&mut self) {
        if self.state == PollState::Stopped {
            return;
        }
        self.state = PollState::Stopped;
        self.token.cancel();
        info!(target_kind = ?self.target, "Poll monitor stopped");
    }

    /// Wait for the polling task to finish. Returns immediately if it never started.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "poll monitor task ended abnormally");
            }
        }
    }
}

impl Drop for PollMonitor {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct PollWorker {
    target: PollTarget,
    delay: Duration,
    client: ClipboardClient,
    events: Arc<dyn HostEventPort>,
    token: CancellationToken,
    last_observed: String,
}

impl PollWorker {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(self.delay) => {}
            }
            self.tick().await;
        }
        debug!("poll loop exited");
    }

    async fn tick(&mut self) {
        let current = match self.target.read(&self.client).await {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "poll read failed");
                return;
            }
        };
        if current != self.last_observed && !self.token.is_cancelled() {
            let payload = ChangePayload { value: &current };
            let emitted = match serde_json::to_value(payload) {
                Ok(payload) => self.events.emit(self.target.event(), payload).await,
                Err(err) => {
                    warn!(error = %err, "failed to encode poll payload");
                    Ok(())
                }
            };
            if let Err(err) = emitted {
                warn!(event = self.target.event(), error = %err, "failed to emit poll event");
            }
        }
        self.last_observed = current;
    }
}

/// Start a text poll monitor with the default 500 ms delay.
#[deprecated(note = "use `MonitorLifecycle::start_listening` with the host monitor")]
pub fn start_text_monitor(client: ClipboardClient, events: Arc<dyn HostEventPort>) -> PollMonitor {
    let mut monitor = PollMonitor::new(PollTarget::Text, client, events);
    monitor.start();
    monitor
}

/// Start an image poll monitor with the default 1000 ms delay.
#[deprecated(note = "use `MonitorLifecycle::start_listening` with the host monitor")]
pub fn start_image_monitor(client: ClipboardClient, events: Arc<dyn HostEventPort>) -> PollMonitor {
    let mut monitor = PollMonitor::new(PollTarget::Image, client, events);
    monitor.start();
    monitor
}
