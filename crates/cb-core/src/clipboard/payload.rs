use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ContentKind;
use crate::error::PayloadError;

/// Per-kind change event payload: `{ "value": T }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePayload<T> {
    pub value: T,
}

impl<T: DeserializeOwned> ChangePayload<T> {
    /// Strictly decode `{ "value": T }` and return the inner value.
    ///
    /// A missing `value` field, or one of the wrong type, is a schema error.
    /// Nothing is coerced.
    pub fn decode(event: &str, payload: &Value) -> Result<T, PayloadError> {
        decode_payload::<ChangePayload<T>>(event, payload).map(|p| p.value)
    }
}

/// Strictly decode any event payload into `T`.
pub fn decode_payload<T: DeserializeOwned>(event: &str, payload: &Value) -> Result<T, PayloadError> {
    T::deserialize(payload).map_err(|source| PayloadError::Schema {
        event: event.to_string(),
        source,
    })
}

/// A decoded clipboard change of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardChange {
    Text(String),
    Html(String),
    Rtf(String),
    Files(Vec<String>),
    /// Base64 encoded PNG.
    Image(String),
    /// PNG bytes.
    ImageBinary(Vec<u8>),
}

impl ClipboardChange {
    pub fn kind(&self) -> ContentKind {
        match self {
            ClipboardChange::Text(_) => ContentKind::Text,
            ClipboardChange::Html(_) => ContentKind::Html,
            ClipboardChange::Rtf(_) => ContentKind::Rtf,
            ClipboardChange::Files(_) => ContentKind::Files,
            ClipboardChange::Image(_) => ContentKind::Image,
            ClipboardChange::ImageBinary(_) => ContentKind::ImageBinary,
        }
    }

    pub fn event_name(&self) -> &'static str {
        self.kind().changed_event()
    }

    pub fn to_payload(&self) -> Value {
        match self {
            ClipboardChange::Text(v)
            | ClipboardChange::Html(v)
            | ClipboardChange::Rtf(v)
            | ClipboardChange::Image(v) => json!({ "value": v }),
            ClipboardChange::Files(v) => json!({ "value": v }),
            ClipboardChange::ImageBinary(v) => json!({ "value": v }),
        }
    }

    /// Decode the payload of `kind`'s change event.
    pub fn decode(kind: ContentKind, payload: &Value) -> Result<Self, PayloadError> {
        let event = kind.changed_event();
        Ok(match kind {
            ContentKind::Text => ClipboardChange::Text(ChangePayload::decode(event, payload)?),
            ContentKind::Html => ClipboardChange::Html(ChangePayload::decode(event, payload)?),
            ContentKind::Rtf => ClipboardChange::Rtf(ChangePayload::decode(event, payload)?),
            ContentKind::Files => ClipboardChange::Files(ChangePayload::decode(event, payload)?),
            ContentKind::Image => ClipboardChange::Image(ChangePayload::decode(event, payload)?),
            ContentKind::ImageBinary => {
                ClipboardChange::ImageBinary(ChangePayload::decode(event, payload)?)
            }
        })
    }
}
