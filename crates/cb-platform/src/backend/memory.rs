use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use cb_core::ContentKind;

use super::{ChangeNotifier, ClipboardBackend, WatchGuard};

/// Everything a [`MemoryClipboard`] holds at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryContent {
    pub text: Option<String>,
    pub html: Option<String>,
    pub rtf: Option<String>,
    /// File URIs.
    pub files: Option<Vec<String>>,
    pub image_png: Option<Vec<u8>>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_rtf(mut self, rtf: impl Into<String>) -> Self {
        self.rtf = Some(rtf.into());
        self
    }

    pub fn with_files<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(uris.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_image_png(mut self, png: Vec<u8>) -> Self {
        self.image_png = Some(png);
        self
    }
}

type Watchers = Arc<Mutex<HashMap<u64, ChangeNotifier>>>;

/// Clipboard held in process memory.
///
/// Every write replaces the whole content, like a fresh copy on a desktop
/// clipboard, and notifies active watchers.
#[derive(Default)]
pub struct MemoryClipboard {
    content: Mutex<MemoryContent>,
    watchers: Watchers,
    next_watch: AtomicU64,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: MemoryContent) -> Self {
        Self {
            content: Mutex::new(content),
            ..Self::default()
        }
    }

    /// Simulate a copy made by another application.
    pub fn replace(&self, content: MemoryContent) {
        self.set(content);
    }

    pub fn content(&self) -> MemoryContent {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryContent> {
        self.content.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, content: MemoryContent) {
        *self.lock() = content;
        let notifiers: Vec<ChangeNotifier> = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for notify in notifiers {
            notify();
        }
    }

    fn read<T>(&self, what: &str, pick: impl FnOnce(&MemoryContent) -> Option<T>) -> Result<T> {
        pick(&self.lock()).ok_or_else(|| anyhow!("no {what} on the clipboard"))
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn has(&self, kind: ContentKind) -> bool {
        let content = self.lock();
        match kind {
            ContentKind::Text => content.text.is_some(),
            ContentKind::Html => content.html.is_some(),
            ContentKind::Rtf => content.rtf.is_some(),
            ContentKind::Files => content.files.is_some(),
            ContentKind::Image | ContentKind::ImageBinary => content.image_png.is_some(),
        }
    }

    fn read_text(&self) -> Result<String> {
        self.read("text", |c| c.text.clone())
    }

    fn read_html(&self) -> Result<String> {
        self.read("html", |c| c.html.clone())
    }

    fn read_rtf(&self) -> Result<String> {
        self.read("rtf", |c| c.rtf.clone())
    }

    fn read_files_uris(&self) -> Result<Vec<String>> {
        self.read("files", |c| c.files.clone())
    }

    fn read_image_png(&self) -> Result<Vec<u8>> {
        self.read("image", |c| c.image_png.clone())
    }

    fn write_text(&self, text: String) -> Result<()> {
        self.set(MemoryContent::new().with_text(text));
        Ok(())
    }

    fn write_html(&self, html: String) -> Result<()> {
        self.set(MemoryContent::new().with_html(html));
        Ok(())
    }

    fn write_html_and_text(&self, html: String, text: String) -> Result<()> {
        self.set(MemoryContent::new().with_html(html).with_text(text));
        Ok(())
    }

    fn write_rtf(&self, rtf: String) -> Result<()> {
        self.set(MemoryContent::new().with_rtf(rtf));
        Ok(())
    }

    /// File copies also expose the URI list as text, one per line.
    fn write_files_uris(&self, uris: Vec<String>) -> Result<()> {
        let text = uris.join("\n");
        self.set(MemoryContent::new().with_files(uris).with_text(text));
        Ok(())
    }

    fn write_image_png(&self, png: &[u8]) -> Result<()> {
        self.set(MemoryContent::new().with_image_png(png.to_vec()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.set(MemoryContent::new());
        Ok(())
    }

    fn watch(&self, notify: ChangeNotifier) -> Result<Box<dyn WatchGuard>> {
        let id = self.next_watch.fetch_add(1, Ordering::Relaxed);
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, notify);
        Ok(Box::new(MemoryWatch {
            id,
            watchers: self.watchers.clone(),
        }))
    }
}

struct MemoryWatch {
    id: u64,
    watchers: Watchers,
}

impl WatchGuard for MemoryWatch {
    fn stop(self: Box<Self>) {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_replace_previous_content() {
        let clipboard = MemoryClipboard::with_content(MemoryContent::new().with_rtf("{\\rtf1}"));
        clipboard.write_html("<b>x</b>".into()).unwrap();

        assert!(clipboard.has(ContentKind::Html));
        assert!(!clipboard.has(ContentKind::Rtf));
        assert!(!clipboard.has(ContentKind::Text));
        assert!(clipboard.read_text().is_err());
    }

    #[test]
    fn file_writes_carry_a_text_projection() {
        let clipboard = MemoryClipboard::new();
        clipboard
            .write_files_uris(vec!["file:///a.txt".into(), "file:///b.txt".into()])
            .unwrap();

        assert!(clipboard.has(ContentKind::Files));
        assert_eq!(clipboard.read_text().unwrap(), "file:///a.txt\nfile:///b.txt");
    }

    #[test]
    fn watchers_are_notified_until_stopped() {
        let clipboard = MemoryClipboard::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let guard = clipboard
            .watch(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        clipboard.write_text("a".into()).unwrap();
        clipboard.replace(MemoryContent::new().with_image_png(vec![1]));
        guard.stop();
        clipboard.clear().unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(clipboard.content(), MemoryContent::default());
    }
}
