use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};
use cb_core::ContentKind;
use clipboard_rs::common::RustImage;
use clipboard_rs::{
    Clipboard, ClipboardContent, ClipboardContext, ClipboardHandler, ClipboardWatcher,
    ClipboardWatcherContext, ContentFormat, RustImageData, WatcherShutdown,
};
use tracing::info;

use super::{ChangeNotifier, ClipboardBackend, WatchGuard};

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

/// The operating system clipboard, through `clipboard-rs`.
pub struct SystemClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let context = map_clipboard_err(ClipboardContext::new())
            .context("ClipboardContext::new failed")?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
        })
    }

    fn with_ctx<T>(&self, f: impl FnOnce(&mut ClipboardContext) -> Result<T>) -> Result<T> {
        let mut ctx = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ctx)
    }
}

fn format_of(kind: ContentKind) -> ContentFormat {
    match kind {
        ContentKind::Text => ContentFormat::Text,
        ContentKind::Html => ContentFormat::Html,
        ContentKind::Rtf => ContentFormat::Rtf,
        ContentKind::Files => ContentFormat::Files,
        ContentKind::Image | ContentKind::ImageBinary => ContentFormat::Image,
    }
}

impl ClipboardBackend for SystemClipboard {
    fn has(&self, kind: ContentKind) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .has(format_of(kind))
    }

    fn read_text(&self) -> Result<String> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.get_text()))
    }

    fn read_html(&self) -> Result<String> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.get_html()))
    }

    fn read_rtf(&self) -> Result<String> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.get_rich_text()))
    }

    fn read_files_uris(&self) -> Result<Vec<String>> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.get_files()))
    }

    fn read_image_png(&self) -> Result<Vec<u8>> {
        let image = self.with_ctx(|ctx| map_clipboard_err(ctx.get_image()))?;
        let png = map_clipboard_err(image.to_png()).context("failed to encode clipboard image as PNG")?;
        Ok(png.get_bytes().to_vec())
    }

    fn write_text(&self, text: String) -> Result<()> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.set_text(text)))
    }

    fn write_html(&self, html: String) -> Result<()> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.set_html(html)))
    }

    fn write_html_and_text(&self, html: String, text: String) -> Result<()> {
        self.with_ctx(|ctx| {
            map_clipboard_err(ctx.set(vec![
                ClipboardContent::Text(text),
                ClipboardContent::Html(html),
            ]))
        })
    }

    fn write_rtf(&self, rtf: String) -> Result<()> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.set_rich_text(rtf)))
    }

    fn write_files_uris(&self, uris: Vec<String>) -> Result<()> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.set_files(uris)))
    }

    fn write_image_png(&self, png: &[u8]) -> Result<()> {
        let image = map_clipboard_err(RustImageData::from_bytes(png)).context("invalid image data")?;
        self.with_ctx(|ctx| map_clipboard_err(ctx.set_image(image)))
    }

    fn clear(&self) -> Result<()> {
        self.with_ctx(|ctx| map_clipboard_err(ctx.clear()))
    }

    fn watch(&self, notify: ChangeNotifier) -> Result<Box<dyn WatchGuard>> {
        let mut watcher_ctx: ClipboardWatcherContext<ChangeForwarder> =
            map_clipboard_err(ClipboardWatcherContext::new())
                .context("Failed to create watcher context")?;
        let shutdown = watcher_ctx
            .add_handler(ChangeForwarder { notify })
            .get_shutdown_channel();

        std::thread::Builder::new()
            .name("clipboard-watch".into())
            .spawn(move || {
                info!("start clipboard watch");
                watcher_ctx.start_watch();
                info!("clipboard watch stopped");
            })
            .context("failed to spawn clipboard watch thread")?;

        Ok(Box::new(SystemWatch { shutdown }))
    }
}

struct ChangeForwarder {
    notify: ChangeNotifier,
}

impl ClipboardHandler for ChangeForwarder {
    fn on_clipboard_change(&mut self) {
        (self.notify)();
    }
}

struct SystemWatch {
    shutdown: WatcherShutdown,
}

impl WatchGuard for SystemWatch {
    fn stop(self: Box<Self>) {
        self.shutdown.stop();
    }
}
