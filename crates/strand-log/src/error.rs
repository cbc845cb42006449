//! Logger-core error conditions (§4.11).

use std::fmt;

#[derive(Debug)]
pub enum LogError {
    Io(std::io::Error),
    QueueClosed,
    Decode(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "LOG-APPENDER-ERROR: {}", e),
            LogError::QueueClosed => write!(f, "LOG-QUEUE-ERROR: appender queue was deleted"),
            LogError::Decode(msg) => write!(f, "LOG-EVENT-DECODE-ERROR: {}", msg),
        }
    }
}
impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(e: std::io::Error) -> Self {
        LogError::Io(e)
    }
}
