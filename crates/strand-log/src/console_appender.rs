//! Console appender: the `Open`/`Close`/`Reopen` lifecycle is a no-op since
//! stdout is always available, unlike `FileAppender`'s owned handle.

use crate::appender::{Appender, AppenderEventKind, Layout, PatternLayout};
use crate::error::LogError;
use crate::event::LogEvent;

pub struct ConsoleAppender {
    layout: Box<dyn Layout>,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        ConsoleAppender { layout: Box::new(PatternLayout) }
    }

    pub fn with_layout(layout: Box<dyn Layout>) -> Self {
        ConsoleAppender { layout }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        ConsoleAppender::new()
    }
}

impl Appender for ConsoleAppender {
    fn process_event(&self, kind: AppenderEventKind, event: Option<&LogEvent>) -> Result<(), LogError> {
        if let AppenderEventKind::Log = kind {
            let event = event.expect("Log events always carry a LogEvent");
            println!("{}", self.layout.format(event));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;

    #[test]
    fn lifecycle_events_other_than_log_are_a_no_op() {
        let appender = ConsoleAppender::new();
        assert!(appender.process_event(AppenderEventKind::Open, None).is_ok());
        assert!(appender.process_event(AppenderEventKind::Close, None).is_ok());
        assert!(appender.process_event(AppenderEventKind::Reopen, None).is_ok());
    }

    #[test]
    fn logging_writes_a_formatted_line_without_error() {
        let appender = ConsoleAppender::new();
        let event = LogEvent {
            level: Level::Info,
            template: "demo ran".to_string(),
            args: vec![],
            logger_name: "strand.demo".to_string(),
            thread_id: "ThreadId(1)".to_string(),
            timestamp: chrono::Utc::now().into(),
            location: None,
            throwable: None,
        };
        assert!(appender.process_event(AppenderEventKind::Log, Some(&event)).is_ok());
    }
}
