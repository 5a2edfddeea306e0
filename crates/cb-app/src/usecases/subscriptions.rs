//! Typed listeners for the change events published by the dispatcher and
//! the poll monitors.
//!
//! Every payload is decoded strictly before the callback runs. A payload that
//! does not match is reported to the decode-error hook and the callback is
//! not invoked.

use std::sync::Arc;

use cb_core::clipboard::decode_payload;
use cb_core::ports::{EventHandler, HostEvent, HostEventPort};
use cb_core::protocol::{events, is_update_marker};
use cb_core::{ChangePayload, ClipboardChange, ContentKind, PayloadError, PresenceFlags, TransportError};
use serde::de::DeserializeOwned;
use tracing::{debug, error, trace};

use super::Subscription;

pub type DecodeErrorHook = Arc<dyn Fn(&PayloadError) + Send + Sync>;

/// Typed event listeners / 类型化事件订阅
///
/// ## Behavior / 行为
///
/// - Per-kind helpers decode `{ "value": T }`; [`Self::on_change`] decodes
///   into a [`ClipboardChange`] for any kind.
/// - [`Self::on_something_update`] decodes the aggregate [`PresenceFlags`].
/// - [`Self::on_monitor_status`] accepts only a boolean payload.
///
/// ## Errors / 错误
///
/// Subscribing fails when the event port rejects the listener. A payload
/// that does not decode goes to the decode-error hook; the callback is not
/// invoked.
#[derive(Clone)]
pub struct EventSubscriptions {
    events: Arc<dyn HostEventPort>,
    on_decode_error: DecodeErrorHook,
}

impl EventSubscriptions {
    /// Malformed payloads are logged at error level until a hook is set.
    pub fn new(events: Arc<dyn HostEventPort>) -> Self {
        Self {
            events,
            on_decode_error: Arc::new(|err: &PayloadError| {
                error!(event = err.event(), error = %err, "Dropping malformed clipboard event");
            }),
        }
    }

    pub fn with_decode_error_hook(
        mut self,
        hook: impl Fn(&PayloadError) + Send + Sync + 'static,
    ) -> Self {
        self.on_decode_error = Arc::new(hook);
        self
    }

    pub async fn on_text_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_value(events::TEXT_CHANGED, callback).await
    }

    pub async fn on_html_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_value(events::HTML_CHANGED, callback).await
    }

    pub async fn on_rtf_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_value(events::RTF_CHANGED, callback).await
    }

    pub async fn on_files_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(Vec<String>) + Send + Sync + 'static,
    {
        self.on_value(events::FILES_CHANGED, callback).await
    }

    /// Callback receives the base64 encoded PNG.
    pub async fn on_image_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_value(events::IMAGE_CHANGED, callback).await
    }

    /// Callback receives the PNG bytes.
    pub async fn on_image_binary_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(Vec<u8>) + Send + Sync + 'static,
    {
        self.on_value(events::IMAGE_BINARY_CHANGED, callback).await
    }

    /// Listen for `kind`'s change event and receive it as a [`ClipboardChange`].
    pub async fn on_change<F>(&self, kind: ContentKind, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(ClipboardChange) + Send + Sync + 'static,
    {
        self.attach(
            kind.changed_event(),
            move |event| ClipboardChange::decode(kind, &event.payload),
            callback,
        )
        .await
    }

    /// Aggregate event published before every per-kind event.
    pub async fn on_something_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(PresenceFlags) + Send + Sync + 'static,
    {
        self.attach(
            events::SOMETHING_CHANGED,
            |event| decode_payload::<PresenceFlags>(&event.name, &event.payload),
            callback,
        )
        .await
    }

    /// Raw host signal, without any probing. Payloads other than the update
    /// marker are ignored.
    pub async fn on_clipboard_update<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(move |event: HostEvent| {
            if is_update_marker(&event.payload) {
                callback();
            } else {
                trace!(payload = %event.payload, "ignoring unrecognized monitor payload");
            }
        });
        self.listen(events::MONITOR_UPDATE, handler).await
    }

    /// Monitor running state as published by the host.
    pub async fn on_monitor_status<F>(&self, callback: F) -> Result<Subscription, TransportError>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.attach(
            events::MONITOR_STATUS,
            |event| decode_payload::<bool>(&event.name, &event.payload),
            callback,
        )
        .await
    }

    async fn on_value<T, F>(&self, event: &'static str, callback: F) -> Result<Subscription, TransportError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.attach(
            event,
            |event| ChangePayload::<T>::decode(&event.name, &event.payload),
            callback,
        )
        .await
    }

    async fn attach<T, D, F>(
        &self,
        event: &'static str,
        decode: D,
        callback: F,
    ) -> Result<Subscription, TransportError>
    where
        T: 'static,
        D: Fn(&HostEvent) -> Result<T, PayloadError> + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let on_decode_error = self.on_decode_error.clone();
        let handler: EventHandler = Arc::new(move |host_event: HostEvent| {
            match decode(&host_event) {
                Ok(value) => callback(value),
                Err(err) => on_decode_error(&err),
            }
        });
        self.listen(event, handler).await
    }

    async fn listen(&self, event: &str, handler: EventHandler) -> Result<Subscription, TransportError> {
        let id = self.events.listen(event, handler).await?;
        debug!(event, listener = %id, "subscribed");
        Ok(Subscription::new(id, self.events.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::test_support::RecordingEvents;
    use cb_core::protocol::UPDATE_MARKER;
    use serde_json::json;

    fn collector<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: T| sink.lock().unwrap().push(value))
    }

    #[tokio::test]
    async fn text_callback_receives_decoded_value() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (seen, callback) = collector::<String>();

        subscriptions.on_text_update(callback).await.unwrap();
        events.deliver(events::TEXT_CHANGED, json!({ "value": "hello" }));

        assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn malformed_payload_reaches_the_hook_not_the_callback() {
        let events = RecordingEvents::new();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        let subscriptions = EventSubscriptions::new(events.clone())
            .with_decode_error_hook(move |err| sink.lock().unwrap().push(err.event().to_string()));
        let (seen, callback) = collector::<String>();

        subscriptions.on_text_update(callback).await.unwrap();
        events.deliver(events::TEXT_CHANGED, json!({ "text": "hello" }));
        events.deliver(events::TEXT_CHANGED, json!({ "value": 42 }));

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(
            *failures.lock().unwrap(),
            vec![events::TEXT_CHANGED.to_string(), events::TEXT_CHANGED.to_string()]
        );
    }

    #[tokio::test]
    async fn files_and_image_binary_decode_their_shapes() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (files, on_files) = collector::<Vec<String>>();
        let (images, on_image) = collector::<Vec<u8>>();

        subscriptions.on_files_update(on_files).await.unwrap();
        subscriptions.on_image_binary_update(on_image).await.unwrap();
        events.deliver(events::FILES_CHANGED, json!({ "value": ["/a.txt"] }));
        events.deliver(events::IMAGE_BINARY_CHANGED, json!({ "value": [137, 80] }));
        events.deliver(events::IMAGE_BINARY_CHANGED, json!({ "value": [137, 999] }));

        assert_eq!(*files.lock().unwrap(), vec![vec!["/a.txt".to_string()]]);
        assert_eq!(*images.lock().unwrap(), vec![vec![137u8, 80]]);
    }

    #[tokio::test]
    async fn on_change_yields_tagged_variants() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (seen, callback) = collector::<ClipboardChange>();

        subscriptions
            .on_change(ContentKind::Html, callback)
            .await
            .unwrap();
        events.deliver(events::HTML_CHANGED, json!({ "value": "<i>x</i>" }));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ClipboardChange::Html("<i>x</i>".into())]
        );
    }

    #[tokio::test]
    async fn something_update_requires_complete_flags() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (seen, callback) = collector::<PresenceFlags>();

        subscriptions.on_something_update(callback).await.unwrap();
        events.deliver(events::SOMETHING_CHANGED, json!({ "text": true }));
        events.deliver(
            events::SOMETHING_CHANGED,
            json!({
                "text": true,
                "html": false,
                "rtf": false,
                "image": true,
                "imageBinary": true,
                "files": false
            }),
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].text);
        assert!(seen[0].is_present(ContentKind::ImageBinary));
    }

    #[tokio::test]
    async fn clipboard_update_fires_only_for_the_marker() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (seen, callback) = collector::<()>();

        subscriptions
            .on_clipboard_update(move || callback(()))
            .await
            .unwrap();
        events.deliver(events::MONITOR_UPDATE, json!("other"));
        events.deliver(events::MONITOR_UPDATE, json!(UPDATE_MARKER));

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn monitor_status_and_unsubscribe() {
        let events = RecordingEvents::new();
        let subscriptions = EventSubscriptions::new(events.clone());
        let (seen, callback) = collector::<bool>();

        let subscription = subscriptions.on_monitor_status(callback).await.unwrap();
        events.deliver(events::MONITOR_STATUS, json!(true));
        subscription.unsubscribe();
        events.deliver(events::MONITOR_STATUS, json!(false));

        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }
}
