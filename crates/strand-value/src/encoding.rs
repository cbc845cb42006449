//! Character encoding tags carried by `Value::String`.

use std::fmt;

/// The encoding a `String` value's bytes are interpreted under.
///
/// Only the encodings actually exercised by the core's string operators are
/// modeled; a full codec table belongs to a built-in module, not the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    /// The canonical encoding used to normalize `Hash` keys (§3 invariant:
    /// keys are "encoding-normalized to the canonical byte encoding").
    pub const CANONICAL: Encoding = Encoding::Utf8;

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Ascii => "US-ASCII",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transcode `bytes` (tagged `from`) into `to`'s byte representation.
///
/// Fails when the byte sequence cannot be represented in the target
/// encoding (e.g. non-ASCII bytes transcoded to `Ascii`). Callers surface
/// this as `ENCODING-CONVERSION-ERROR` (§4.1, §7).
pub fn transcode(bytes: &[u8], from: Encoding, to: Encoding) -> Result<Vec<u8>, EncodingError> {
    if from == to {
        return Ok(bytes.to_vec());
    }
    // All three supported tags describe a superset-of-ASCII byte layout for
    // the codepoints the core actually manipulates, so the only possible
    // failure transcoding *into* a narrower encoding is a byte outside that
    // encoding's range.
    match to {
        Encoding::Ascii => {
            if bytes.iter().any(|b| *b >= 0x80) {
                return Err(EncodingError { from, to });
            }
            Ok(bytes.to_vec())
        }
        Encoding::Latin1 | Encoding::Utf8 => Ok(bytes.to_vec()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingError {
    pub from: Encoding,
    pub to: Encoding,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ENCODING-CONVERSION-ERROR: cannot convert from {} to {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for EncodingError {}
