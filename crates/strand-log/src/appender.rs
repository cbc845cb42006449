//! Appenders and layouts (§4.11): each appender has a layout (formatter)
//! and handles the four event kinds a pump thread or a direct caller can
//! hand it.

use crate::error::LogError;
use crate::event::LogEvent;

pub trait Layout: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;
}

/// `{timestamp} {level} {logger}: {message}` — the default, fixed-format
/// layout every built-in appender falls back to.
pub struct PatternLayout;

impl Layout for PatternLayout {
    fn format(&self, event: &LogEvent) -> String {
        format!("{} {:<5} {}: {}", event.timestamp.to_rfc3339(), event.level, event.logger_name, event.render())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppenderEventKind {
    Open,
    Close,
    Reopen,
    Log,
}

/// An event sink attached to one or more loggers. `process_event` is the
/// single entry point every event kind goes through (§4.11: "a separate
/// pump thread dequeues and drives each appender's `process_event(kind,
/// params)`"); `Log` carries the event, the other three carry `None`.
pub trait Appender: Send + Sync {
    fn process_event(&self, kind: AppenderEventKind, event: Option<&LogEvent>) -> Result<(), LogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;

    #[test]
    fn pattern_layout_includes_logger_name_and_rendered_message() {
        let event = LogEvent {
            level: Level::Warn,
            template: "disk at {}%".to_string(),
            args: vec![strand_value::Value::Int(91)],
            logger_name: "app.disk".to_string(),
            thread_id: "ThreadId(1)".to_string(),
            timestamp: chrono::Utc::now().into(),
            location: None,
            throwable: None,
        };
        let line = PatternLayout.format(&event);
        assert!(line.contains("WARN"));
        assert!(line.contains("app.disk"));
        assert!(line.contains("disk at 91%"));
    }
}
