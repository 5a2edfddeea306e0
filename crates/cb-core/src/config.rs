//! Configuration DTOs.
//!
//! Pure data. Loading from disk lives in the binary's bootstrap; this module
//! only describes the shape of the TOML document and its defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::ListenSelection;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Kinds surfaced by the change dispatcher.
    pub listen: ListenSelection,
    pub poll: PollConfig,
    pub log: LogConfig,
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Delays of the legacy polling monitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub text_delay_ms: u64,
    pub image_delay_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            text_delay_ms: 500,
            image_delay_ms: 1000,
        }
    }
}

impl PollConfig {
    pub fn text_delay(&self) -> Duration {
        Duration::from_millis(self.text_delay_ms)
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives; `RUST_LOG` still wins when set.
    pub filter: Option<String>,
    /// When set, logs are also written to `<directory>/clipboard-bridge.log`.
    pub directory: Option<PathBuf>,
}
