//! Use cases built on the host ports.

pub mod dispatcher;
pub mod lifecycle;
pub mod poll_monitor;
pub mod subscription;
pub mod subscriptions;

pub use dispatcher::{ClipboardChangeDispatcher, DispatchOutcome};
pub use lifecycle::{ListeningSession, MonitorLifecycle};
#[allow(deprecated)]
pub use poll_monitor::{start_image_monitor, start_text_monitor};
pub use poll_monitor::{PollMonitor, PollState, PollTarget};
pub use subscription::Subscription;
pub use subscriptions::{DecodeErrorHook, EventSubscriptions};
