//! Wire protocol: host command names, event names and typed requests.
//!
//! Command names follow the host's `plugin:<plugin>|<command>` scheme and
//! event names the `plugin:<plugin>://<topic>` scheme. Argument records use
//! camelCase keys because that is what the host deserializes.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::TransportError;

/// Host command names.
pub mod commands {
    pub const START_MONITOR: &str = "plugin:clipboard|start_monitor";
    pub const STOP_MONITOR: &str = "plugin:clipboard|stop_monitor";
    pub const IS_MONITOR_RUNNING: &str = "plugin:clipboard|is_monitor_running";

    pub const HAS_TEXT: &str = "plugin:clipboard|has_text";
    pub const HAS_HTML: &str = "plugin:clipboard|has_html";
    pub const HAS_RTF: &str = "plugin:clipboard|has_rtf";
    pub const HAS_IMAGE: &str = "plugin:clipboard|has_image";
    pub const HAS_FILES: &str = "plugin:clipboard|has_files";
    pub const AVAILABLE_TYPES: &str = "plugin:clipboard|available_types";

    pub const READ_TEXT: &str = "plugin:clipboard|read_text";
    pub const READ_HTML: &str = "plugin:clipboard|read_html";
    pub const READ_RTF: &str = "plugin:clipboard|read_rtf";
    pub const READ_FILES: &str = "plugin:clipboard|read_files";
    pub const READ_FILES_URIS: &str = "plugin:clipboard|read_files_uris";
    pub const READ_IMAGE_BASE64: &str = "plugin:clipboard|read_image_base64";
    pub const READ_IMAGE_BINARY: &str = "plugin:clipboard|read_image_binary";

    pub const WRITE_TEXT: &str = "plugin:clipboard|write_text";
    pub const WRITE_HTML: &str = "plugin:clipboard|write_html";
    pub const WRITE_HTML_AND_TEXT: &str = "plugin:clipboard|write_html_and_text";
    pub const WRITE_RTF: &str = "plugin:clipboard|write_rtf";
    pub const WRITE_FILES: &str = "plugin:clipboard|write_files";
    pub const WRITE_FILES_URIS: &str = "plugin:clipboard|write_files_uris";
    pub const WRITE_IMAGE_BASE64: &str = "plugin:clipboard|write_image_base64";
    pub const WRITE_IMAGE_BINARY: &str = "plugin:clipboard|write_image_binary";
    pub const CLEAR: &str = "plugin:clipboard|clear";
}

/// Host → subscriber event names.
pub mod events {
    /// Bare "check the clipboard" signal raised by the host monitor.
    pub const MONITOR_UPDATE: &str = "plugin:clipboard://clipboard-monitor/update";
    pub const MONITOR_STATUS: &str = "plugin:clipboard://clipboard-monitor/status";

    pub const SOMETHING_CHANGED: &str = "plugin:clipboard://something-changed";
    pub const TEXT_CHANGED: &str = "plugin:clipboard://text-changed";
    pub const HTML_CHANGED: &str = "plugin:clipboard://html-changed";
    pub const RTF_CHANGED: &str = "plugin:clipboard://rtf-changed";
    pub const FILES_CHANGED: &str = "plugin:clipboard://files-changed";
    pub const IMAGE_CHANGED: &str = "plugin:clipboard://image-changed";
    pub const IMAGE_BINARY_CHANGED: &str = "plugin:clipboard://image-changed-binary";
}

/// The only monitor-update payload that means "an update happened".
pub const UPDATE_MARKER: &str = "clipboard update";

/// Returns true when a monitor-update payload is the recognized marker.
/// Anything else on that channel is reserved for other signals.
pub fn is_update_marker(payload: &Value) -> bool {
    payload.as_str() == Some(UPDATE_MARKER)
}

/// A typed clipboard command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardRequest {
    StartMonitor,
    StopMonitor,
    IsMonitorRunning,

    HasText,
    HasHtml,
    HasRtf,
    HasImage,
    HasFiles,
    AvailableTypes,

    ReadText,
    ReadHtml,
    ReadRtf,
    ReadFiles,
    ReadFilesUris,
    ReadImageBase64,
    ReadImageBinary,

    WriteText { text: String },
    WriteHtml { html: String },
    WriteHtmlAndText { html: String, text: String },
    WriteRtf { rtf: String },
    WriteFiles { paths: Vec<String> },
    WriteFilesUris { uris: Vec<String> },
    WriteImageBase64 { base64: String },
    WriteImageBinary { bytes: Vec<u8> },
    Clear,
}

#[derive(Deserialize)]
struct TextArgs {
    text: String,
}

#[derive(Deserialize)]
struct HtmlArgs {
    html: String,
}

#[derive(Deserialize)]
struct HtmlAndTextArgs {
    html: String,
    text: String,
}

#[derive(Deserialize)]
struct RtfArgs {
    rtf: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilesArgs {
    files_paths: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilesUrisArgs {
    files_uris: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageBase64Args {
    base64_image: String,
}

#[derive(Deserialize)]
struct ImageBinaryArgs {
    bytes: Vec<u8>,
}

impl ClipboardRequest {
    /// Host command name.
    pub fn command(&self) -> &'static str {
        use ClipboardRequest::*;
        match self {
            StartMonitor => commands::START_MONITOR,
            StopMonitor => commands::STOP_MONITOR,
            IsMonitorRunning => commands::IS_MONITOR_RUNNING,
            HasText => commands::HAS_TEXT,
            HasHtml => commands::HAS_HTML,
            HasRtf => commands::HAS_RTF,
            HasImage => commands::HAS_IMAGE,
            HasFiles => commands::HAS_FILES,
            AvailableTypes => commands::AVAILABLE_TYPES,
            ReadText => commands::READ_TEXT,
            ReadHtml => commands::READ_HTML,
            ReadRtf => commands::READ_RTF,
            ReadFiles => commands::READ_FILES,
            ReadFilesUris => commands::READ_FILES_URIS,
            ReadImageBase64 => commands::READ_IMAGE_BASE64,
            ReadImageBinary => commands::READ_IMAGE_BINARY,
            WriteText { .. } => commands::WRITE_TEXT,
            WriteHtml { .. } => commands::WRITE_HTML,
            WriteHtmlAndText { .. } => commands::WRITE_HTML_AND_TEXT,
            WriteRtf { .. } => commands::WRITE_RTF,
            WriteFiles { .. } => commands::WRITE_FILES,
            WriteFilesUris { .. } => commands::WRITE_FILES_URIS,
            WriteImageBase64 { .. } => commands::WRITE_IMAGE_BASE64,
            WriteImageBinary { .. } => commands::WRITE_IMAGE_BINARY,
            Clear => commands::CLEAR,
        }
    }

    /// Argument record sent with the command; `null` for argument-less commands.
    pub fn args(&self) -> Value {
        use ClipboardRequest::*;
        match self {
            WriteText { text } => json!({ "text": text }),
            WriteHtml { html } => json!({ "html": html }),
            WriteHtmlAndText { html, text } => json!({ "html": html, "text": text }),
            WriteRtf { rtf } => json!({ "rtf": rtf }),
            WriteFiles { paths } => json!({ "filesPaths": paths }),
            WriteFilesUris { uris } => json!({ "filesUris": uris }),
            WriteImageBase64 { base64 } => json!({ "base64Image": base64 }),
            WriteImageBinary { bytes } => json!({ "bytes": bytes }),
            _ => Value::Null,
        }
    }

    /// Parse an incoming invocation on the host side.
    ///
    /// Unknown command names fail with [`TransportError::NotImplemented`];
    /// argument records that do not match fail with
    /// [`TransportError::InvalidArguments`].
    pub fn from_wire(command: &str, args: &Value) -> Result<Self, TransportError> {
        use ClipboardRequest::*;
        let request = match command {
            commands::START_MONITOR => StartMonitor,
            commands::STOP_MONITOR => StopMonitor,
            commands::IS_MONITOR_RUNNING => IsMonitorRunning,
            commands::HAS_TEXT => HasText,
            commands::HAS_HTML => HasHtml,
            commands::HAS_RTF => HasRtf,
            commands::HAS_IMAGE => HasImage,
            commands::HAS_FILES => HasFiles,
            commands::AVAILABLE_TYPES => AvailableTypes,
            commands::READ_TEXT => ReadText,
            commands::READ_HTML => ReadHtml,
            commands::READ_RTF => ReadRtf,
            commands::READ_FILES => ReadFiles,
            commands::READ_FILES_URIS => ReadFilesUris,
            commands::READ_IMAGE_BASE64 => ReadImageBase64,
            commands::READ_IMAGE_BINARY => ReadImageBinary,
            commands::WRITE_TEXT => {
                let a: TextArgs = parse_args(command, args)?;
                WriteText { text: a.text }
            }
            commands::WRITE_HTML => {
                let a: HtmlArgs = parse_args(command, args)?;
                WriteHtml { html: a.html }
            }
            commands::WRITE_HTML_AND_TEXT => {
                let a: HtmlAndTextArgs = parse_args(command, args)?;
                WriteHtmlAndText {
                    html: a.html,
                    text: a.text,
                }
            }
            commands::WRITE_RTF => {
                let a: RtfArgs = parse_args(command, args)?;
                WriteRtf { rtf: a.rtf }
            }
            commands::WRITE_FILES => {
                let a: FilesArgs = parse_args(command, args)?;
                WriteFiles {
                    paths: a.files_paths,
                }
            }
            commands::WRITE_FILES_URIS => {
                let a: FilesUrisArgs = parse_args(command, args)?;
                WriteFilesUris { uris: a.files_uris }
            }
            commands::WRITE_IMAGE_BASE64 => {
                let a: ImageBase64Args = parse_args(command, args)?;
                WriteImageBase64 {
                    base64: a.base64_image,
                }
            }
            commands::WRITE_IMAGE_BINARY => {
                let a: ImageBinaryArgs = parse_args(command, args)?;
                WriteImageBinary { bytes: a.bytes }
            }
            commands::CLEAR => Clear,
            other => return Err(TransportError::NotImplemented(other.to_string())),
        };
        Ok(request)
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    command: &str,
    args: &Value,
) -> Result<T, TransportError> {
    T::deserialize(args).map_err(|err| TransportError::InvalidArguments {
        command: command.to_string(),
        message: err.to_string(),
    })
}
