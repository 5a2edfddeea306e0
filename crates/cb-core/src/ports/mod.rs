//! Port interfaces toward the host runtime.
//!
//! The host exposes two channels: named request/response commands and a
//! publish/subscribe event stream. The application layer depends only on
//! these traits; `cb-platform` provides in-process implementations and any
//! other host (an IPC bridge, a test double) can implement them too.

mod command;
mod event;

pub use command::HostCommandPort;
pub use event::{EventHandler, HostEvent, HostEventPort, ListenerId};
