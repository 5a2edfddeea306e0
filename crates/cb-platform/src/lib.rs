//! In-process host for clipboard-bridge.
//!
//! [`LocalClipboardHost`] answers the clipboard command set from a
//! [`ClipboardBackend`] (the system clipboard, or memory for tests and
//! demos) and publishes monitor events on an [`InMemoryEventBus`].

pub mod backend;
pub mod bus;
pub mod host;

pub use backend::{ClipboardBackend, MemoryClipboard, MemoryContent, SystemClipboard};
pub use bus::InMemoryEventBus;
pub use host::LocalClipboardHost;
