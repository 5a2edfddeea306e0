//! Clipboard storage behind the local host.
//!
//! Backends are synchronous; the host moves every call onto the blocking
//! pool. File lists cross this boundary in URI form (`file:///...`, plain
//! paths on Windows), the way the operating system clipboard reports them.

mod memory;
mod system;

use std::sync::Arc;

use anyhow::Result;
use cb_core::ContentKind;

pub use memory::{MemoryClipboard, MemoryContent};
pub use system::SystemClipboard;

/// Called by a backend whenever its clipboard changes while watched.
pub type ChangeNotifier = Arc<dyn Fn() + Send + Sync>;

/// Keeps a watch alive. Stopping is explicit.
pub trait WatchGuard: Send {
    fn stop(self: Box<Self>);
}

pub trait ClipboardBackend: Send + Sync {
    /// `ImageBinary` is answered like `Image`.
    fn has(&self, kind: ContentKind) -> bool;

    fn read_text(&self) -> Result<String>;
    fn read_html(&self) -> Result<String>;
    fn read_rtf(&self) -> Result<String>;
    fn read_files_uris(&self) -> Result<Vec<String>>;
    /// Image encoded as PNG.
    fn read_image_png(&self) -> Result<Vec<u8>>;

    fn write_text(&self, text: String) -> Result<()>;
    /// HTML only; no text projection is added.
    fn write_html(&self, html: String) -> Result<()>;
    fn write_html_and_text(&self, html: String, text: String) -> Result<()>;
    fn write_rtf(&self, rtf: String) -> Result<()>;
    fn write_files_uris(&self, uris: Vec<String>) -> Result<()>;
    fn write_image_png(&self, png: &[u8]) -> Result<()>;
    fn clear(&self) -> Result<()>;

    /// Start watching for changes; `notify` runs once per change.
    fn watch(&self, notify: ChangeNotifier) -> Result<Box<dyn WatchGuard>>;
}
