use serde::{Deserialize, Serialize};

use super::ContentKind;

/// Which kinds a dispatcher subscription surfaces as typed events.
///
/// The default enables everything except [`ContentKind::ImageBinary`], whose
/// payload is large and duplicates [`ContentKind::Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSelection {
    pub text: bool,
    pub html: bool,
    pub rtf: bool,
    pub files: bool,
    pub image: bool,
    pub image_binary: bool,
}

impl Default for ListenSelection {
    fn default() -> Self {
        Self {
            text: true,
            html: true,
            rtf: true,
            files: true,
            image: true,
            image_binary: false,
        }
    }
}

impl ListenSelection {
    pub fn all() -> Self {
        Self {
            image_binary: true,
            ..Self::default()
        }
    }

    pub fn none() -> Self {
        Self {
            text: false,
            html: false,
            rtf: false,
            files: false,
            image: false,
            image_binary: false,
        }
    }

    pub fn with(mut self, kind: ContentKind, enabled: bool) -> Self {
        *self.slot(kind) = enabled;
        self
    }

    pub fn is_enabled(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => self.text,
            ContentKind::Html => self.html,
            ContentKind::Rtf => self.rtf,
            ContentKind::Files => self.files,
            ContentKind::Image => self.image,
            ContentKind::ImageBinary => self.image_binary,
        }
    }

    fn slot(&mut self, kind: ContentKind) -> &mut bool {
        match kind {
            ContentKind::Text => &mut self.text,
            ContentKind::Html => &mut self.html,
            ContentKind::Rtf => &mut self.rtf,
            ContentKind::Files => &mut self.files,
            ContentKind::Image => &mut self.image,
            ContentKind::ImageBinary => &mut self.image_binary,
        }
    }
}
