//! Configuration loading.
//!
//! Reads the TOML document described by [`BridgeConfig`]. Defaults for
//! missing sections and fields come from the DTO itself; nothing here
//! validates values.

use std::path::PathBuf;

use anyhow::Context;
use cb_core::BridgeConfig;

pub const APP_DIR_NAME: &str = "clipboard-bridge";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `<platform config dir>/clipboard-bridge/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read or its content is not a valid
/// configuration document.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<BridgeConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    BridgeConfig::from_toml_str(&content).context("Failed to parse config as TOML")
}

/// Pick the configuration for this run.
///
/// An explicit path must exist. Without one, the default location is used
/// when a file is there, otherwise built-in defaults apply.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<BridgeConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => load_config(path),
            _ => Ok(BridgeConfig::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::ContentKind;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [listen]
            image_binary = true
            files = false

            [poll]
            text_delay_ms = 250

            [log]
            filter = "cb_app=trace"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert!(config.listen.is_enabled(ContentKind::ImageBinary));
        assert!(!config.listen.is_enabled(ContentKind::Files));
        assert!(config.listen.is_enabled(ContentKind::Text));
        assert_eq!(config.poll.text_delay(), Duration::from_millis(250));
        assert_eq!(config.poll.image_delay(), Duration::from_millis(1000));
        assert_eq!(config.log.filter.as_deref(), Some("cb_app=trace"));
        assert!(config.log.directory.is_none());
    }

    #[test]
    fn test_load_config_returns_error_on_missing_file() {
        let err = load_config(PathBuf::from("/nonexistent/clipboard-bridge.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_returns_error_on_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[listen\ntext = true").unwrap();

        let err = load_config(temp_file.path().to_path_buf()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }

    #[test]
    fn test_load_config_rejects_wrong_field_types() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[poll]\ntext_delay_ms = \"fast\"\n")
            .unwrap();

        assert!(load_config(temp_file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_resolve_config_requires_explicit_path_to_exist() {
        assert!(resolve_config(Some(PathBuf::from("/nonexistent/config.toml"))).is_err());
    }

    #[test]
    fn test_default_config_path_ends_with_app_file() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("clipboard-bridge/config.toml"));
        }
    }
}
