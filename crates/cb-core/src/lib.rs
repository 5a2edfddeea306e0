//! # cb-core
//!
//! Domain values, wire protocol and port contracts for clipboard-bridge.
//!
//! Nothing in this crate performs I/O. The host runtime is reached only
//! through the ports in [`ports`], which the application layer (`cb-app`)
//! depends on and the platform layer (`cb-platform`) implements.

pub mod clipboard;
pub mod config;
pub mod convert;
pub mod error;
pub mod ports;
pub mod protocol;

pub use clipboard::{ChangePayload, ClipboardChange, ContentKind, ListenSelection, PresenceFlags};
pub use config::{BridgeConfig, LogConfig, PollConfig};
pub use error::{BridgeError, ConvertError, ParseKindError, PayloadError, TransportError};
pub use protocol::ClipboardRequest;
