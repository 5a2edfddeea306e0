//! Process setup: configuration and logging.

pub mod config;
pub mod tracing;

pub use config::{default_config_path, load_config, resolve_config};
pub use tracing::init_tracing_subscriber;
