use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;
use crate::protocol::events;

/// A distinct clipboard representation.
///
/// Kinds are not mutually exclusive: one write on the host can populate
/// several of them (an HTML copy usually carries a plain-text projection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Html,
    Rtf,
    Files,
    /// Image as a base64 encoded PNG string.
    Image,
    /// Image as raw PNG bytes.
    ImageBinary,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Text,
        ContentKind::Html,
        ContentKind::Rtf,
        ContentKind::Files,
        ContentKind::Image,
        ContentKind::ImageBinary,
    ];

    /// Order in which kinds are considered once files did not claim the
    /// notification.
    pub const DISPATCH_ORDER: [ContentKind; 5] = [
        ContentKind::Image,
        ContentKind::ImageBinary,
        ContentKind::Html,
        ContentKind::Rtf,
        ContentKind::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Html => "html",
            ContentKind::Rtf => "rtf",
            ContentKind::Files => "files",
            ContentKind::Image => "image",
            ContentKind::ImageBinary => "image_binary",
        }
    }

    /// Name of the per-kind change event.
    pub fn changed_event(&self) -> &'static str {
        match self {
            ContentKind::Text => events::TEXT_CHANGED,
            ContentKind::Html => events::HTML_CHANGED,
            ContentKind::Rtf => events::RTF_CHANGED,
            ContentKind::Files => events::FILES_CHANGED,
            ContentKind::Image => events::IMAGE_CHANGED,
            ContentKind::ImageBinary => events::IMAGE_BINARY_CHANGED,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentKind::Text),
            "html" => Ok(ContentKind::Html),
            "rtf" => Ok(ContentKind::Rtf),
            "files" => Ok(ContentKind::Files),
            "image" => Ok(ContentKind::Image),
            "image_binary" | "image-binary" => Ok(ContentKind::ImageBinary),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_from_its_name() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>(), Ok(kind));
        }
        assert!("svg".parse::<ContentKind>().is_err());
    }

    #[test]
    fn dispatch_order_excludes_files() {
        assert!(!ContentKind::DISPATCH_ORDER.contains(&ContentKind::Files));
        assert_eq!(ContentKind::DISPATCH_ORDER[0], ContentKind::Image);
        assert_eq!(ContentKind::DISPATCH_ORDER[4], ContentKind::Text);
    }
}
