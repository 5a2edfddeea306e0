//! Command facade: one typed method per host clipboard command.
//!
//! Every method forwards to [`HostCommandPort::invoke`] and decodes the
//! result strictly. Failures are returned as-is; nothing is swallowed here.

use std::fmt;
use std::sync::Arc;

use cb_core::convert::{BinaryObject, ImageBinary, ImageBinaryFormat, ObjectUrl, ObjectUrlRegistry};
use cb_core::ports::HostCommandPort;
use cb_core::{BridgeError, ClipboardRequest, ContentKind, PresenceFlags};
use serde::de::DeserializeOwned;
use tracing::trace;

#[derive(Clone)]
pub struct ClipboardClient {
    commands: Arc<dyn HostCommandPort>,
}

impl ClipboardClient {
    pub fn new(commands: Arc<dyn HostCommandPort>) -> Self {
        Self { commands }
    }

    async fn call<T: DeserializeOwned>(&self, request: ClipboardRequest) -> Result<T, BridgeError> {
        let command = request.command();
        trace!(command, "invoking host command");
        let value = self.commands.invoke(command, request.args()).await?;
        serde_json::from_value(value)
            .map_err(|source| BridgeError::UnexpectedResult { command, source })
    }

    async fn call_unit(&self, request: ClipboardRequest) -> Result<(), BridgeError> {
        let command = request.command();
        trace!(command, "invoking host command");
        self.commands.invoke(command, request.args()).await?;
        Ok(())
    }

    // Presence

    pub async fn has_text(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::HasText).await
    }

    pub async fn has_html(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::HasHtml).await
    }

    pub async fn has_rtf(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::HasRtf).await
    }

    pub async fn has_image(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::HasImage).await
    }

    pub async fn has_files(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::HasFiles).await
    }

    /// Presence check by kind. `ImageBinary` asks the same question as `Image`.
    pub async fn has(&self, kind: ContentKind) -> Result<bool, BridgeError> {
        match kind {
            ContentKind::Text => self.has_text().await,
            ContentKind::Html => self.has_html().await,
            ContentKind::Rtf => self.has_rtf().await,
            ContentKind::Files => self.has_files().await,
            ContentKind::Image | ContentKind::ImageBinary => self.has_image().await,
        }
    }

    pub async fn available_types(&self) -> Result<PresenceFlags, BridgeError> {
        self.call(ClipboardRequest::AvailableTypes).await
    }

    // Reads

    pub async fn read_text(&self) -> Result<String, BridgeError> {
        self.call(ClipboardRequest::ReadText).await
    }

    pub async fn read_html(&self) -> Result<String, BridgeError> {
        self.call(ClipboardRequest::ReadHtml).await
    }

    pub async fn read_rtf(&self) -> Result<String, BridgeError> {
        self.call(ClipboardRequest::ReadRtf).await
    }

    /// File list as absolute paths.
    pub async fn read_files(&self) -> Result<Vec<String>, BridgeError> {
        self.call(ClipboardRequest::ReadFiles).await
    }

    /// File list as `file://` URIs (plain paths on Windows).
    pub async fn read_files_uris(&self) -> Result<Vec<String>, BridgeError> {
        self.call(ClipboardRequest::ReadFilesUris).await
    }

    /// Clipboard image as a base64 encoded PNG.
    pub async fn read_image_base64(&self) -> Result<String, BridgeError> {
        self.call(ClipboardRequest::ReadImageBase64).await
    }

    /// Clipboard image PNG bytes, shaped as `format`.
    pub async fn read_image_binary(
        &self,
        format: ImageBinaryFormat,
    ) -> Result<ImageBinary, BridgeError> {
        let ints: Vec<i64> = self.call(ClipboardRequest::ReadImageBinary).await?;
        Ok(ImageBinary::from_ints(ints, format)?)
    }

    pub async fn read_image_bytes(&self) -> Result<Vec<u8>, BridgeError> {
        match self.read_image_binary(ImageBinaryFormat::ByteBuffer).await? {
            ImageBinary::ByteBuffer(bytes) => Ok(bytes),
            ImageBinary::IntArray(ints) => Ok(cb_core::convert::to_byte_buffer(&ints)?),
            ImageBinary::BinaryObject(object) => Ok(object.bytes().to_vec()),
        }
    }

    /// Read the image and register it in `registry`.
    ///
    /// The returned URL keeps the image alive until the caller revokes it.
    pub async fn read_image_object_url(
        &self,
        registry: &ObjectUrlRegistry,
    ) -> Result<ObjectUrl, BridgeError> {
        let object = match self.read_image_binary(ImageBinaryFormat::BinaryObject).await? {
            ImageBinary::BinaryObject(object) => object,
            ImageBinary::ByteBuffer(bytes) => BinaryObject::new(bytes),
            ImageBinary::IntArray(ints) => {
                BinaryObject::new(cb_core::convert::to_byte_buffer(&ints)?)
            }
        };
        Ok(registry.create(object.with_mime("image/png")))
    }

    // Writes

    pub async fn write_text(&self, text: impl Into<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteText { text: text.into() })
            .await
    }

    /// Write HTML only; a later text read may find nothing.
    pub async fn write_html(&self, html: impl Into<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteHtml { html: html.into() })
            .await
    }

    /// Write HTML together with its plain-text projection.
    pub async fn write_html_and_text(
        &self,
        html: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteHtmlAndText {
            html: html.into(),
            text: text.into(),
        })
        .await
    }

    pub async fn write_rtf(&self, rtf: impl Into<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteRtf { rtf: rtf.into() })
            .await
    }

    /// Write absolute file paths.
    pub async fn write_files(&self, paths: Vec<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteFiles { paths }).await
    }

    /// Write `file:///...` URIs (plain `C:\...` paths on Windows).
    pub async fn write_files_uris(&self, uris: Vec<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteFilesUris { uris }).await
    }

    pub async fn write_image_base64(&self, base64: impl Into<String>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteImageBase64 {
            base64: base64.into(),
        })
        .await
    }

    pub async fn write_image_binary(&self, bytes: Vec<u8>) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::WriteImageBinary { bytes })
            .await
    }

    pub async fn clear(&self) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::Clear).await
    }

    // Monitor control

    pub async fn start_monitor(&self) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::StartMonitor).await
    }

    pub async fn stop_monitor(&self) -> Result<(), BridgeError> {
        self.call_unit(ClipboardRequest::StopMonitor).await
    }

    pub async fn is_monitor_running(&self) -> Result<bool, BridgeError> {
        self.call(ClipboardRequest::IsMonitorRunning).await
    }
}

impl fmt::Debug for ClipboardClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockCommands;
    use cb_core::protocol::commands;
    use cb_core::TransportError;
    use mockall::predicate::eq;
    use serde_json::{json, Value};

    fn client(mock: MockCommands) -> ClipboardClient {
        ClipboardClient::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn write_text_sends_text_argument() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .with(eq(commands::WRITE_TEXT), eq(json!({ "text": "hello" })))
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        client(mock).write_text("hello").await.expect("write text");
    }

    #[tokio::test]
    async fn read_files_decodes_string_list() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .with(eq(commands::READ_FILES), eq(Value::Null))
            .returning(|_, _| Ok(json!(["/a.txt", "/b.txt"])));

        let files = client(mock).read_files().await.unwrap();
        assert_eq!(files, vec!["/a.txt".to_string(), "/b.txt".to_string()]);
    }

    #[tokio::test]
    async fn mistyped_result_is_an_error_not_a_coercion() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .returning(|_, _| Ok(json!("true")));

        let err = client(mock).has_text().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::UnexpectedResult {
                command: commands::HAS_TEXT,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .returning(|command, _| Err(TransportError::rejected(command, "no image")));

        let err = client(mock).read_image_base64().await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(TransportError::Rejected { .. })));
    }

    #[tokio::test]
    async fn not_implemented_is_reported_explicitly() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .returning(|command, _| Err(TransportError::NotImplemented(command.to_string())));

        let err = client(mock).read_rtf().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Transport(TransportError::NotImplemented(ref c)) if c == commands::READ_RTF
        ));
    }

    #[tokio::test]
    async fn read_image_binary_shapes_host_integers() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .with(eq(commands::READ_IMAGE_BINARY), eq(Value::Null))
            .returning(|_, _| Ok(json!([137, 80, 78, 71])));
        let client = client(mock);

        let ints = client
            .read_image_binary(ImageBinaryFormat::IntArray)
            .await
            .unwrap();
        assert_eq!(ints, ImageBinary::IntArray(vec![137, 80, 78, 71]));

        let bytes = client.read_image_bytes().await.unwrap();
        assert_eq!(bytes, vec![137, 80, 78, 71]);
    }

    #[tokio::test]
    async fn read_image_binary_rejects_out_of_range_integers() {
        let mut mock = MockCommands::new();
        mock.expect_invoke().returning(|_, _| Ok(json!([1, 999])));

        let err = client(mock).read_image_bytes().await.unwrap_err();
        assert!(matches!(err, BridgeError::Convert(_)));
    }

    #[tokio::test]
    async fn object_url_resolves_to_image_bytes() {
        let mut mock = MockCommands::new();
        mock.expect_invoke().returning(|_, _| Ok(json!([1, 2, 3])));
        let registry = ObjectUrlRegistry::new();

        let url = client(mock)
            .read_image_object_url(&registry)
            .await
            .unwrap();
        let object = registry.resolve(&url).expect("registered");
        assert_eq!(object.bytes().as_ref(), &[1, 2, 3]);
        assert_eq!(object.mime(), Some("image/png"));
        assert!(registry.revoke(&url));
    }

    #[tokio::test]
    async fn available_types_decodes_presence_record() {
        let mut mock = MockCommands::new();
        mock.expect_invoke()
            .with(eq(commands::AVAILABLE_TYPES), eq(Value::Null))
            .returning(|_, _| {
                Ok(json!({ "text": true, "html": true, "rtf": false, "image": false, "files": false }))
            });

        let flags = client(mock).available_types().await.unwrap();
        assert!(flags.text && flags.html);
        assert!(!flags.files);
    }
}
