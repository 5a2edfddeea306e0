//! Clipboard domain values.

mod kind;
mod payload;
mod presence;
mod selection;

pub use kind::ContentKind;
pub use payload::{decode_payload, ChangePayload, ClipboardChange};
pub use presence::PresenceFlags;
pub use selection::ListenSelection;
