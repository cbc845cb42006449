//! File-backed appender (§4.11: "The file appender implements these
//! [Open/Close/Reopen/Log] against an owned file handle").

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::appender::{Appender, AppenderEventKind, Layout, PatternLayout};
use crate::error::LogError;
use crate::event::LogEvent;

pub struct FileAppender {
    path: PathBuf,
    layout: Box<dyn Layout>,
    file: Mutex<Option<File>>,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAppender::with_layout(path, Box::new(PatternLayout))
    }

    pub fn with_layout(path: impl Into<PathBuf>, layout: Box<dyn Layout>) -> Self {
        FileAppender { path: path.into(), layout, file: Mutex::new(None) }
    }

    fn open(&self) -> Result<File, LogError> {
        Ok(OpenOptions::new().create(true).append(true).open(&self.path)?)
    }
}

impl Appender for FileAppender {
    fn process_event(&self, kind: AppenderEventKind, event: Option<&LogEvent>) -> Result<(), LogError> {
        match kind {
            AppenderEventKind::Open => {
                *self.file.lock() = Some(self.open()?);
                Ok(())
            }
            AppenderEventKind::Close => {
                self.file.lock().take();
                Ok(())
            }
            AppenderEventKind::Reopen => {
                self.file.lock().take();
                *self.file.lock() = Some(self.open()?);
                Ok(())
            }
            AppenderEventKind::Log => {
                let event = event.expect("Log events always carry a LogEvent");
                let line = self.layout.format(event);
                let mut guard = self.file.lock();
                let file = guard
                    .as_mut()
                    .ok_or_else(|| LogError::Io(std::io::Error::new(std::io::ErrorKind::NotConnected, "appender not open")))?;
                writeln!(file, "{}", line)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;
    use std::io::Read;

    fn sample_event(message: &str) -> LogEvent {
        LogEvent {
            level: Level::Info,
            template: message.to_string(),
            args: Vec::new(),
            logger_name: "app".to_string(),
            thread_id: "ThreadId(1)".to_string(),
            timestamp: chrono::Utc::now().into(),
            location: None,
            throwable: None,
        }
    }

    #[test]
    fn open_write_close_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let appender = FileAppender::new(&path);
        appender.process_event(AppenderEventKind::Open, None).unwrap();
        appender.process_event(AppenderEventKind::Log, Some(&sample_event("hello"))).unwrap();
        appender.process_event(AppenderEventKind::Close, None).unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.contains("hello"));
    }

    #[test]
    fn logging_before_open_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let appender = FileAppender::new(dir.path().join("app.log"));
        let err = appender.process_event(AppenderEventKind::Log, Some(&sample_event("too early"))).unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
    }

    #[test]
    fn reopen_preserves_prior_content_since_it_reopens_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let appender = FileAppender::new(&path);
        appender.process_event(AppenderEventKind::Open, None).unwrap();
        appender.process_event(AppenderEventKind::Log, Some(&sample_event("first"))).unwrap();
        appender.process_event(AppenderEventKind::Reopen, None).unwrap();
        appender.process_event(AppenderEventKind::Log, Some(&sample_event("second"))).unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
    }
}
