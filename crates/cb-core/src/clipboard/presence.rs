use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ContentKind;

/// Which content kinds were on the clipboard when one notification was probed.
///
/// Also the result shape of the `available_types` command. All five fields
/// are required when decoding; the extra `imageBinary` key carried by the
/// aggregate "something changed" event is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceFlags {
    pub text: bool,
    pub html: bool,
    pub rtf: bool,
    pub image: bool,
    pub files: bool,
}

impl PresenceFlags {
    pub fn is_present(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => self.text,
            ContentKind::Html => self.html,
            ContentKind::Rtf => self.rtf,
            ContentKind::Files => self.files,
            ContentKind::Image | ContentKind::ImageBinary => self.image,
        }
    }

    /// Result of the `available_types` command.
    pub fn to_payload(&self) -> Value {
        json!({
            "text": self.text,
            "html": self.html,
            "rtf": self.rtf,
            "image": self.image,
            "files": self.files,
        })
    }

    /// Payload of the aggregate "something changed" event. `imageBinary`
    /// mirrors `image`: both come from the same presence probe.
    pub fn to_change_payload(&self) -> Value {
        json!({
            "text": self.text,
            "html": self.html,
            "rtf": self.rtf,
            "image": self.image,
            "imageBinary": self.image,
            "files": self.files,
        })
    }

    pub fn is_empty(&self) -> bool {
        !(self.text || self.html || self.rtf || self.image || self.files)
    }

    pub fn present_kinds(&self) -> Vec<ContentKind> {
        [
            ContentKind::Files,
            ContentKind::Image,
            ContentKind::Html,
            ContentKind::Rtf,
            ContentKind::Text,
        ]
        .into_iter()
        .filter(|kind| self.is_present(*kind))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_binary_follows_image_flag() {
        let flags = PresenceFlags {
            image: true,
            ..Default::default()
        };
        assert!(flags.is_present(ContentKind::ImageBinary));
        assert!(!flags.is_present(ContentKind::Text));
    }

    #[test]
    fn decoding_requires_every_flag() {
        let partial = json!({ "text": true, "html": false });
        assert!(serde_json::from_value::<PresenceFlags>(partial).is_err());
    }

    #[test]
    fn present_kinds_lists_files_first() {
        let flags = PresenceFlags {
            text: true,
            files: true,
            ..Default::default()
        };
        assert_eq!(
            flags.present_kinds(),
            vec![ContentKind::Files, ContentKind::Text]
        );
    }

    #[test]
    fn payload_decodes_back_into_flags() {
        let flags = PresenceFlags {
            html: true,
            text: true,
            ..Default::default()
        };
        let decoded: PresenceFlags = serde_json::from_value(flags.to_payload()).unwrap();
        assert_eq!(decoded, flags);
    }

    #[test]
    fn change_payload_reports_image_binary_with_image() {
        let flags = PresenceFlags {
            image: true,
            ..Default::default()
        };
        let payload = flags.to_change_payload();

        assert_eq!(payload["imageBinary"], json!(true));
        assert!(flags.to_payload().get("imageBinary").is_none());
        let decoded: PresenceFlags = serde_json::from_value(payload).unwrap();
        assert_eq!(decoded, flags);
    }
}
