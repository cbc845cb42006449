//! Hierarchical logger core (§4.11, C11): levels, events, layouts,
//! appenders (including a queued pump-thread wrapper), and a dotted-name
//! logger tree with additivity.

pub mod appender;
pub mod codec;
pub mod console_appender;
pub mod error;
pub mod event;
pub mod file_appender;
pub mod logger;
pub mod pump;

pub use appender::{Appender, AppenderEventKind, Layout, PatternLayout};
pub use console_appender::ConsoleAppender;
pub use error::LogError;
pub use event::{Level, LogEvent, LogLocation};
pub use file_appender::FileAppender;
pub use logger::Logger;
pub use pump::QueuedAppender;
