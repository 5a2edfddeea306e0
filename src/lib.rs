//! clipboard-bridge binary support: process bootstrap and the command line.
//!
//! The library surface lives in the workspace crates: `cb-core` for domain
//! values and ports, `cb-app` for the client and change detection, and
//! `cb-platform` for the in-process host.

pub mod bootstrap;
pub mod cli;
