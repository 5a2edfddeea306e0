//! clipboard-bridge application layer
//!
//! Typed access to the host clipboard and the change-detection protocol that
//! turns the host's bare "clipboard update" signal into per-kind events.

pub mod facade;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;

pub use facade::ClipboardClient;
pub use usecases::{
    ClipboardChangeDispatcher, DispatchOutcome, EventSubscriptions, ListeningSession,
    MonitorLifecycle, PollMonitor, PollState, PollTarget, Subscription,
};
