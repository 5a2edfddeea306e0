//! In-process clipboard host.
//!
//! Serves the `plugin:clipboard|...` command set from a [`ClipboardBackend`]
//! and publishes monitor events on an [`InMemoryEventBus`].

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cb_core::ports::HostCommandPort;
use cb_core::protocol::{events, UPDATE_MARKER};
use cb_core::{ClipboardRequest, ContentKind, PresenceFlags, TransportError};
use serde_json::{json, Value};
use tracing::{debug, info, info_span, Instrument};

use crate::backend::{ChangeNotifier, ClipboardBackend, WatchGuard};
use crate::bus::InMemoryEventBus;

const FILE_SCHEME: &str = "file://";

pub struct LocalClipboardHost<B> {
    backend: Arc<B>,
    events: Arc<InMemoryEventBus>,
    monitor: Mutex<Option<Box<dyn WatchGuard>>>,
}

impl<B: ClipboardBackend + 'static> LocalClipboardHost<B> {
    pub fn new(backend: B, events: Arc<InMemoryEventBus>) -> Self {
        Self::from_shared(Arc::new(backend), events)
    }

    pub fn from_shared(backend: Arc<B>, events: Arc<InMemoryEventBus>) -> Self {
        Self {
            backend,
            events,
            monitor: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn events(&self) -> &Arc<InMemoryEventBus> {
        &self.events
    }

    /// Start forwarding backend changes as monitor-update events.
    ///
    /// Always announces `true` on the status channel; a second start keeps
    /// the existing watch.
    fn start_monitor(&self) -> Result<()> {
        self.events.publish(events::MONITOR_STATUS, json!(true));

        let mut monitor = self.monitor.lock().unwrap_or_else(PoisonError::into_inner);
        if monitor.is_some() {
            debug!("Clipboard monitor already running, skipping start");
            return Ok(());
        }

        let bus = self.events.clone();
        let notify: ChangeNotifier = Arc::new(move || {
            bus.publish(events::MONITOR_UPDATE, json!(UPDATE_MARKER));
        });
        *monitor = Some(self.backend.watch(notify)?);
        info!("Clipboard monitor started");
        Ok(())
    }

    fn stop_monitor(&self) {
        self.events.publish(events::MONITOR_STATUS, json!(false));

        let guard = self
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(guard) = guard {
            guard.stop();
            info!("Clipboard monitor stopped");
        }
    }

    fn is_monitor_running(&self) -> bool {
        self.monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Execute a clipboard access request against `backend`.
fn execute<B: ClipboardBackend>(backend: &B, request: ClipboardRequest) -> Result<Value> {
    use ClipboardRequest::*;
    let value = match request {
        HasText => json!(backend.has(ContentKind::Text)),
        HasHtml => json!(backend.has(ContentKind::Html)),
        HasRtf => json!(backend.has(ContentKind::Rtf)),
        HasImage => json!(backend.has(ContentKind::Image)),
        HasFiles => json!(backend.has(ContentKind::Files)),
        AvailableTypes => PresenceFlags {
            text: backend.has(ContentKind::Text),
            html: backend.has(ContentKind::Html),
            rtf: backend.has(ContentKind::Rtf),
            image: backend.has(ContentKind::Image),
            files: backend.has(ContentKind::Files),
        }
        .to_payload(),

        ReadText => json!(backend.read_text()?),
        ReadHtml => json!(backend.read_html()?),
        ReadRtf => json!(backend.read_rtf()?),
        ReadFilesUris => json!(backend.read_files_uris()?),
        ReadFiles => json!(uris_to_paths(backend.read_files_uris()?)),
        ReadImageBase64 => json!(STANDARD.encode(backend.read_image_png()?)),
        ReadImageBinary => json!(backend.read_image_png()?),

        WriteText { text } => {
            backend.write_text(text)?;
            Value::Null
        }
        WriteHtml { html } => {
            backend.write_html(html)?;
            Value::Null
        }
        WriteHtmlAndText { html, text } => {
            backend.write_html_and_text(html, text)?;
            Value::Null
        }
        WriteRtf { rtf } => {
            backend.write_rtf(rtf)?;
            Value::Null
        }
        WriteFiles { paths } => {
            backend.write_files_uris(paths_to_uris(paths))?;
            Value::Null
        }
        WriteFilesUris { uris } => {
            validate_file_uris(&uris)?;
            backend.write_files_uris(uris)?;
            Value::Null
        }
        WriteImageBase64 { base64 } => {
            let png = STANDARD
                .decode(base64.as_bytes())
                .context("invalid base64 image")?;
            backend.write_image_png(&png)?;
            Value::Null
        }
        WriteImageBinary { bytes } => {
            backend.write_image_png(&bytes)?;
            Value::Null
        }
        Clear => {
            backend.clear()?;
            Value::Null
        }

        StartMonitor | StopMonitor | IsMonitorRunning => {
            bail!("monitor commands are handled by the host")
        }
    };
    Ok(value)
}

/// Strip a leading `file://` from each entry.
fn uris_to_paths(uris: Vec<String>) -> Vec<String> {
    uris.into_iter()
        .map(|uri| match uri.strip_prefix(FILE_SCHEME) {
            Some(path) => path.to_string(),
            None => uri,
        })
        .collect()
}

/// Absolute paths to the URI form the platform clipboard expects.
fn paths_to_uris(paths: Vec<String>) -> Vec<String> {
    if cfg!(windows) {
        return paths;
    }
    paths
        .into_iter()
        .map(|path| {
            if path.starts_with(FILE_SCHEME) {
                path
            } else {
                format!("{FILE_SCHEME}{path}")
            }
        })
        .collect()
}

fn validate_file_uris(uris: &[String]) -> Result<()> {
    for uri in uris {
        let has_scheme = uri.starts_with(FILE_SCHEME);
        if cfg!(windows) && has_scheme {
            bail!("Invalid file uri: {uri}. File uri on Windows should not start with file://");
        }
        if !cfg!(windows) && !has_scheme {
            bail!("Invalid file uri: {uri}. File uri should start with file://");
        }
    }
    Ok(())
}

#[async_trait]
impl<B: ClipboardBackend + 'static> HostCommandPort for LocalClipboardHost<B> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError> {
        let request = ClipboardRequest::from_wire(command, &args)?;

        let outcome = async {
            match request {
                ClipboardRequest::StartMonitor => self.start_monitor().map(|_| Value::Null),
                ClipboardRequest::StopMonitor => {
                    self.stop_monitor();
                    Ok(Value::Null)
                }
                ClipboardRequest::IsMonitorRunning => Ok(json!(self.is_monitor_running())),
                request => {
                    let backend = self.backend.clone();
                    tokio::task::spawn_blocking(move || execute(backend.as_ref(), request))
                        .await
                        .context("clipboard task failed")
                        .and_then(|result| result)
                }
            }
        }
        .instrument(info_span!("host.invoke", command))
        .await;

        outcome.map_err(|err| {
            let message = format!("{err:#}");
            debug!(command, error = %message, "clipboard command rejected");
            TransportError::rejected(command, message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryClipboard, MemoryContent};
    use cb_core::protocol::commands;
    use cb_core::ports::HostEventPort;
    use std::sync::Mutex as StdMutex;

    fn host(content: MemoryContent) -> LocalClipboardHost<MemoryClipboard> {
        LocalClipboardHost::new(
            MemoryClipboard::with_content(content),
            Arc::new(InMemoryEventBus::new()),
        )
    }

    #[tokio::test]
    async fn read_files_strips_the_scheme() {
        let host = host(MemoryContent::new().with_files(["file:///tmp/a.txt", "C:\\b.txt"]));

        let files = host.invoke(commands::READ_FILES, Value::Null).await.unwrap();
        assert_eq!(files, json!(["/tmp/a.txt", "C:\\b.txt"]));

        let uris = host
            .invoke(commands::READ_FILES_URIS, Value::Null)
            .await
            .unwrap();
        assert_eq!(uris, json!(["file:///tmp/a.txt", "C:\\b.txt"]));
    }

    #[tokio::test]
    async fn reading_an_absent_kind_is_rejected() {
        let host = host(MemoryContent::new().with_text("x"));

        let err = host
            .invoke(commands::READ_HTML, Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected { ref command, .. } if command == commands::READ_HTML));
    }

    #[tokio::test]
    async fn unknown_commands_are_not_implemented() {
        let host = host(MemoryContent::new());
        let err = host
            .invoke("plugin:clipboard|read_svg", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::NotImplemented("plugin:clipboard|read_svg".into())
        );
    }

    #[tokio::test]
    async fn image_round_trips_through_base64_and_integers() {
        let host = host(MemoryContent::new());
        host.invoke(
            commands::WRITE_IMAGE_BASE64,
            json!({ "base64Image": STANDARD.encode([137u8, 80, 78, 71]) }),
        )
        .await
        .unwrap();

        let ints = host
            .invoke(commands::READ_IMAGE_BINARY, Value::Null)
            .await
            .unwrap();
        assert_eq!(ints, json!([137, 80, 78, 71]));
        let flags = host
            .invoke(commands::AVAILABLE_TYPES, Value::Null)
            .await
            .unwrap();
        assert_eq!(flags["image"], json!(true));
        assert_eq!(flags["text"], json!(false));
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected() {
        let host = host(MemoryContent::new());
        let err = host
            .invoke(commands::WRITE_IMAGE_BASE64, json!({ "base64Image": "***" }))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected { .. }));
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn file_uris_must_carry_the_scheme() {
        let host = host(MemoryContent::new());
        let err = host
            .invoke(commands::WRITE_FILES_URIS, json!({ "filesUris": ["/tmp/a.txt"] }))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected { ref message, .. } if message.contains("should start with file://")));

        host.invoke(commands::WRITE_FILES, json!({ "filesPaths": ["/tmp/a.txt"] }))
            .await
            .unwrap();
        assert_eq!(
            host.backend().content().files,
            Some(vec!["file:///tmp/a.txt".to_string()])
        );
    }

    #[tokio::test]
    async fn monitor_publishes_status_and_update_marker() {
        let host = host(MemoryContent::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        for event in [events::MONITOR_STATUS, events::MONITOR_UPDATE] {
            let sink = seen.clone();
            host.events()
                .listen(event, Arc::new(move |e| sink.lock().unwrap().push(e)))
                .await
                .unwrap();
        }

        host.invoke(commands::START_MONITOR, Value::Null).await.unwrap();
        host.invoke(commands::START_MONITOR, Value::Null).await.unwrap();
        assert_eq!(
            host.invoke(commands::IS_MONITOR_RUNNING, Value::Null).await.unwrap(),
            json!(true)
        );
        host.invoke(commands::WRITE_TEXT, json!({ "text": "hi" }))
            .await
            .unwrap();
        host.invoke(commands::STOP_MONITOR, Value::Null).await.unwrap();
        host.invoke(commands::WRITE_TEXT, json!({ "text": "again" }))
            .await
            .unwrap();

        let seen: Vec<(String, Value)> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|e| (e.name.clone(), e.payload.clone()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (events::MONITOR_STATUS.to_string(), json!(true)),
                (events::MONITOR_STATUS.to_string(), json!(true)),
                (events::MONITOR_UPDATE.to_string(), json!(UPDATE_MARKER)),
                (events::MONITOR_STATUS.to_string(), json!(false)),
            ]
        );
        assert_eq!(
            host.invoke(commands::IS_MONITOR_RUNNING, Value::Null).await.unwrap(),
            json!(false)
        );
    }
}
