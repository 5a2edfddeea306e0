//! Turns the host's bare monitor signal into typed change events.
//!
//! The host only says "the clipboard changed". For every such notification
//! the dispatcher probes which kinds are present, publishes the aggregate
//! "something changed" event and then one event per selected kind, with file
//! lists taking precedence over everything else.

use std::sync::Arc;

use cb_core::ports::{EventHandler, HostEvent, HostEventPort};
use cb_core::protocol::{events, is_update_marker};
use cb_core::{BridgeError, ClipboardChange, ContentKind, ListenSelection, PresenceFlags, TransportError};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, trace, warn, Instrument};

use super::Subscription;
use crate::facade::ClipboardClient;

/// What one notification produced. Returned for inspection and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub flags: PresenceFlags,
    /// Per-kind events emitted, in emission order.
    pub emitted: Vec<ContentKind>,
}

/// Change-detection use case / 剪贴板变更分发
///
/// ## Behavior / 行为
///
/// - Only the `"clipboard update"` marker on the monitor-update channel
///   triggers work; other payloads are ignored.
/// - The five presence probes run concurrently. A probe that fails counts as
///   absent.
/// - The aggregate event is always emitted first, with `imageBinary`
///   mirroring `image`.
/// - A non-empty file list claims the notification: files-changed is the
///   only per-kind event.
/// - Otherwise Image, ImageBinary, Html, Rtf and Text are fetched in that
///   order. A failed fetch skips only its own kind. An empty base64 image is
///   skipped; empty image bytes are delivered.
///
/// ## Cancellation / 取消
///
/// The subscription's token is checked before every emit, so an unsubscribed
/// dispatcher stops mid-notification.
#[derive(Clone)]
pub struct ClipboardChangeDispatcher {
    client: ClipboardClient,
    events: Arc<dyn HostEventPort>,
}

impl ClipboardChangeDispatcher {
    pub fn new(client: ClipboardClient, events: Arc<dyn HostEventPort>) -> Self {
        Self { client, events }
    }

    /// Subscribe to the monitor-update channel.
    ///
    /// Each recognized notification is handled on its own task; overlapping
    /// notifications are not coalesced and their events may interleave.
    /// Must be called from within a tokio runtime.
    pub async fn listen(&self, selection: ListenSelection) -> Result<Subscription, TransportError> {
        let runtime = Handle::current();
        let token = CancellationToken::new();

        let dispatcher = self.clone();
        let handler_token = token.clone();
        let handler: EventHandler = Arc::new(move |event: HostEvent| {
            if !is_update_marker(&event.payload) {
                trace!(payload = %event.payload, "ignoring unrecognized monitor payload");
                return;
            }
            if handler_token.is_cancelled() {
                return;
            }

            let dispatcher = dispatcher.clone();
            let token = handler_token.clone();
            runtime.spawn(
                async move {
                    dispatcher.handle_notification(selection, &token).await;
                }
                .instrument(info_span!("dispatcher.notification")),
            );
        });

        let id = self.events.listen(events::MONITOR_UPDATE, handler).await?;
        info!(listener = %id, ?selection, "clipboard change dispatcher attached");

        Ok(Subscription::new(id, self.events.clone()).with_token(token))
    }

    /// Process one notification.
    ///
    /// Nothing is emitted once `token` is cancelled, including between the
    /// per-kind events of this notification.
    pub async fn handle_notification(
        &self,
        selection: ListenSelection,
        token: &CancellationToken,
    ) -> DispatchOutcome {
        let flags = self.probe().await;
        let mut outcome = DispatchOutcome {
            flags,
            emitted: Vec::new(),
        };
        debug!(?flags, "clipboard presence probed");

        if !self
            .emit(token, events::SOMETHING_CHANGED, flags.to_change_payload())
            .await
        {
            return outcome;
        }

        if selection.files && flags.files {
            match self.client.read_files().await {
                Ok(files) if !files.is_empty() => {
                    let change = ClipboardChange::Files(files);
                    if self
                        .emit(token, change.event_name(), change.to_payload())
                        .await
                    {
                        outcome.emitted.push(ContentKind::Files);
                    }
                    return outcome;
                }
                Ok(_) => debug!("file list is empty, checking other kinds"),
                Err(err) => debug!(error = %err, "failed to read files, checking other kinds"),
            }
        }

        for kind in ContentKind::DISPATCH_ORDER {
            if !selection.is_enabled(kind) || !flags.is_present(kind) {
                continue;
            }
            let change = match self.fetch(kind).await {
                Ok(Some(change)) => change,
                Ok(None) => {
                    debug!(%kind, "empty content, skipped");
                    continue;
                }
                Err(err) => {
                    debug!(%kind, error = %err, "failed to read content, skipped");
                    continue;
                }
            };
            if !self
                .emit(token, change.event_name(), change.to_payload())
                .await
            {
                break;
            }
            outcome.emitted.push(kind);
        }

        outcome
    }

    async fn probe(&self) -> PresenceFlags {
        let (files, image, html, rtf, text) = tokio::join!(
            self.client.has_files(),
            self.client.has_image(),
            self.client.has_html(),
            self.client.has_rtf(),
            self.client.has_text(),
        );
        PresenceFlags {
            files: probed(ContentKind::Files, files),
            image: probed(ContentKind::Image, image),
            html: probed(ContentKind::Html, html),
            rtf: probed(ContentKind::Rtf, rtf),
            text: probed(ContentKind::Text, text),
        }
    }

    async fn fetch(&self, kind: ContentKind) -> Result<Option<ClipboardChange>, BridgeError> {
        let change = match kind {
            ContentKind::Image => {
                let base64 = self.client.read_image_base64().await?;
                (!base64.is_empty()).then_some(ClipboardChange::Image(base64))
            }
            // An empty byte array is still a successful read and is delivered.
            ContentKind::ImageBinary => {
                Some(ClipboardChange::ImageBinary(self.client.read_image_bytes().await?))
            }
            ContentKind::Html => Some(ClipboardChange::Html(self.client.read_html().await?)),
            ContentKind::Rtf => Some(ClipboardChange::Rtf(self.client.read_rtf().await?)),
            ContentKind::Text => Some(ClipboardChange::Text(self.client.read_text().await?)),
            ContentKind::Files => {
                let files = self.client.read_files().await?;
                (!files.is_empty()).then_some(ClipboardChange::Files(files))
            }
        };
        Ok(change)
    }

    /// Emit unless cancelled. Returns false when the notification should stop.
    async fn emit(&self, token: &CancellationToken, event: &str, payload: Value) -> bool {
        if token.is_cancelled() {
            debug!(event, "subscription cancelled, dropping event");
            return false;
        }
        if let Err(err) = self.events.emit(event, payload).await {
            warn!(event, error = %err, "failed to emit clipboard event");
        }
        true
    }
}

/// A failed probe counts as absent.
fn probed(kind: ContentKind, result: Result<bool, BridgeError>) -> bool {
    result.unwrap_or_else(|err| {
        warn!(%kind, error = %err, "presence probe failed, treating as absent");
        false
    })
}
