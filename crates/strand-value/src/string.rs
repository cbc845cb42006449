//! `Value::String`'s payload: an encoding-tagged, copy-on-write byte buffer.

use std::fmt;
use std::sync::Arc;

use crate::encoding::{transcode, Encoding, EncodingError};

#[derive(Debug, Clone)]
pub struct QString {
    bytes: Arc<Vec<u8>>,
    encoding: Encoding,
}

impl QString {
    pub fn new(s: impl Into<String>, encoding: Encoding) -> Self {
        QString { bytes: Arc::new(s.into().into_bytes()), encoding }
    }

    pub fn from_utf8(s: impl Into<String>) -> Self {
        Self::new(s, Encoding::Utf8)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy-on-write mutation point: clones the underlying buffer only if
    /// this isn't the sole owner (§3: "copy-on-write permitted").
    pub fn ensure_unique(&mut self) -> &mut Vec<u8> {
        Arc::make_mut(&mut self.bytes)
    }

    pub fn concat(&self, other: &QString) -> Result<QString, EncodingError> {
        let other_bytes = transcode(other.as_bytes(), other.encoding, self.encoding)?;
        let mut combined = (*self.bytes).clone();
        combined.extend_from_slice(&other_bytes);
        Ok(QString { bytes: Arc::new(combined), encoding: self.encoding })
    }

    pub fn transcode_to(&self, target: Encoding) -> Result<QString, EncodingError> {
        let converted = transcode(&self.bytes, self.encoding, target)?;
        Ok(QString { bytes: Arc::new(converted), encoding: target })
    }
}

impl PartialEq for QString {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding && self.bytes == other.bytes
    }
}

impl fmt::Display for QString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
