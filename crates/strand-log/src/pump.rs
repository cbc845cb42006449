//! Drives an appender from a dedicated thread (§4.11: "a separate pump
//! thread dequeues and drives each appender's `process_event`"), so
//! application threads hand off a log line and never block on I/O.

use std::sync::Arc;
use std::thread::JoinHandle;

use strand_value::queue::{BlockingQueue, Timeout};

use crate::appender::{Appender, AppenderEventKind};
use crate::codec;
use crate::error::LogError;
use crate::event::LogEvent;

/// Wraps any [`Appender`] with a [`BlockingQueue`]-backed pump thread. Events
/// handed to [`QueuedAppender::process_event`] are encoded and enqueued;
/// the pump thread decodes and replays them against the wrapped appender.
pub struct QueuedAppender {
    queue: Arc<BlockingQueue>,
    pump: Option<JoinHandle<()>>,
}

impl QueuedAppender {
    pub fn spawn(inner: Arc<dyn Appender>, capacity: Option<usize>) -> Self {
        let queue = Arc::new(BlockingQueue::new(capacity));
        let pump_queue = queue.clone();
        let pump = std::thread::Builder::new()
            .name("strand-log-pump".to_string())
            .spawn(move || Self::run(pump_queue, inner))
            .expect("spawning the log pump thread");
        QueuedAppender { queue, pump: Some(pump) }
    }

    fn run(queue: Arc<BlockingQueue>, inner: Arc<dyn Appender>) {
        loop {
            let value = match queue.shift(Timeout::Forever) {
                Ok(v) => v,
                Err(_) => return,
            };
            let (kind, event) = match codec::decode(&value) {
                Ok(decoded) => decoded,
                Err(_) => continue,
            };
            let _ = inner.process_event(kind, event.as_ref());
        }
    }

    /// Blocks until every event enqueued so far has been drained, by pushing
    /// a `Close` marker and waiting for the queue to empty. Does not stop
    /// the pump thread.
    pub fn flush(&self) {
        while !self.queue.is_empty() {
            std::thread::yield_now();
        }
    }

    pub fn shutdown(mut self) {
        self.queue.delete();
        if let Some(handle) = self.pump.take() {
            let _ = handle.join();
        }
    }
}

impl Appender for QueuedAppender {
    fn process_event(&self, kind: AppenderEventKind, event: Option<&LogEvent>) -> Result<(), LogError> {
        let encoded = codec::encode(kind, event);
        self.queue.push(encoded, Timeout::Forever).map_err(|_| LogError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    struct CollectingAppender {
        lines: Mutex<Vec<String>>,
    }

    impl Appender for CollectingAppender {
        fn process_event(&self, kind: AppenderEventKind, event: Option<&LogEvent>) -> Result<(), LogError> {
            if kind == AppenderEventKind::Log {
                self.lines.lock().push(event.unwrap().render());
            }
            Ok(())
        }
    }

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
    fn queued_events_eventually_reach_the_wrapped_appender() {
        let inner = Arc::new(CollectingAppender { lines: Mutex::new(Vec::new()) });
        let queued = QueuedAppender::spawn(inner.clone(), None);
        queued.process_event(AppenderEventKind::Log, Some(&sample_event("hello"))).unwrap();
        queued.process_event(AppenderEventKind::Log, Some(&sample_event("world"))).unwrap();

        let mut attempts = 0;
        while inner.lines.lock().len() < 2 && attempts < 100 {
            std::thread::sleep(Duration::from_millis(10));
            attempts += 1;
        }
        assert_eq!(*inner.lines.lock(), vec!["hello".to_string(), "world".to_string()]);
        queued.shutdown();
    }

    #[test]
    fn shutdown_stops_the_pump_thread_cleanly() {
        let inner = Arc::new(CollectingAppender { lines: Mutex::new(Vec::new()) });
        let queued = QueuedAppender::spawn(inner, None);
        queued.shutdown();
    }
}
