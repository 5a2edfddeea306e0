//! Binary payload conversions.
//!
//! The host delivers image bytes as a JSON integer sequence. These helpers
//! turn that sequence into a byte buffer, wrap a buffer into an opaque
//! [`BinaryObject`] and register objects behind resolvable [`ObjectUrl`]s.
//! Nothing here performs I/O.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use uuid::Uuid;

use crate::error::ConvertError;

/// Convert an integer sequence into a byte buffer, value for value.
///
/// Values outside `0..=255` are rejected rather than truncated.
pub fn to_byte_buffer(ints: &[i64]) -> Result<Vec<u8>, ConvertError> {
    ints.iter()
        .enumerate()
        .map(|(index, &value)| {
            u8::try_from(value).map_err(|_| ConvertError::OutOfRange { index, value })
        })
        .collect()
}

pub fn to_int_array(bytes: &[u8]) -> Vec<i64> {
    bytes.iter().map(|&b| i64::from(b)).collect()
}

/// Immutable binary blob. Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryObject {
    data: Bytes,
    mime: Option<String>,
}

impl BinaryObject {
    /// Wrap `buffer` without copying it.
    pub fn new(buffer: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(buffer),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }
}

/// Shape in which image bytes are handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageBinaryFormat {
    /// The host's integer sequence, untouched. Cheapest.
    #[default]
    IntArray,
    ByteBuffer,
    BinaryObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageBinary {
    IntArray(Vec<i64>),
    ByteBuffer(Vec<u8>),
    BinaryObject(BinaryObject),
}

impl ImageBinary {
    /// Shape a host integer sequence into `format`.
    pub fn from_ints(ints: Vec<i64>, format: ImageBinaryFormat) -> Result<Self, ConvertError> {
        Ok(match format {
            ImageBinaryFormat::IntArray => ImageBinary::IntArray(ints),
            ImageBinaryFormat::ByteBuffer => ImageBinary::ByteBuffer(to_byte_buffer(&ints)?),
            ImageBinaryFormat::BinaryObject => {
                ImageBinary::BinaryObject(BinaryObject::new(to_byte_buffer(&ints)?))
            }
        })
    }

    pub fn len(&self) -> usize {
        match self {
            ImageBinary::IntArray(v) => v.len(),
            ImageBinary::ByteBuffer(v) => v.len(),
            ImageBinary::BinaryObject(o) => o.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle that resolves to a registered [`BinaryObject`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry behind [`ObjectUrl`]s.
///
/// Every URL created here keeps its object alive until [`revoke`] is
/// called; a URL that is never revoked is a leak.
///
/// [`revoke`]: ObjectUrlRegistry::revoke
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    objects: Mutex<HashMap<ObjectUrl, BinaryObject>>,
}

impl ObjectUrlRegistry {
    pub const SCHEME: &'static str = "blob:clipboard-bridge/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, object: BinaryObject) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", Self::SCHEME, Uuid::new_v4()));
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), object);
        url
    }

    pub fn resolve(&self, url: &ObjectUrl) -> Option<BinaryObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Release the object behind `url`. Returns false if it was unknown.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
