//! Parse-time errors for pattern compilation (§4.7).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    InvalidPattern { source: String, message: String },
    /// A transliteration range (`a-z`) that is empty or has start > end.
    InvalidRange { range: String },
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::InvalidPattern { source, message } => {
                write!(f, "REGEX-COMPILATION-ERROR: '{}': {}", source, message)
            }
            RegexError::InvalidRange { range } => {
                write!(f, "TRANSLITERATION-RANGE-ERROR: invalid range '{}'", range)
            }
        }
    }
}

impl std::error::Error for RegexError {}

impl From<RegexError> for strand_value::ExceptionCore {
    fn from(e: RegexError) -> Self {
        let err = match &e {
            RegexError::InvalidPattern { .. } => "REGEX-COMPILATION-ERROR",
            RegexError::InvalidRange { .. } => "TRANSLITERATION-RANGE-ERROR",
        };
        strand_value::ExceptionCore::system(err, e.to_string())
    }
}
