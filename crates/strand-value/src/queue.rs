//! The blocking queue (§4.2.3/C2), used both as an async hand-off channel
//! and, in `strand-log`, as the appender event queue.
//!
//! Mirrors the one-mutex/two-condvar design of the source queue: a single
//! lock guards a `VecDeque`, one condvar wakes blocked readers, the other
//! wakes blocked writers, and both sides track a waiter count purely so the
//! destructor knows how many waiters to broadcast to.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::value::Value;

/// How often a cancellable wait re-checks its cancellation flag. The flag
/// can flip from another thread without signaling either condvar, so a
/// cancellable wait polls on this interval instead of sleeping until the
/// full timeout/forever deadline (§4.9: cancellation is "checked at any
/// ... blocking queue operation").
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// A push/pop that would block exceeded its timeout.
    Timeout,
    /// The queue was deleted while a caller was waiting on it, or a caller
    /// tried to use it after deletion.
    Deleted,
    /// The calling thread's cancellation flag was set while waiting
    /// (§4.9: "Blocking queue waits honor the flag by returning
    /// `QUEUE-CANCELLED`").
    Cancelled,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Timeout => write!(f, "QUEUE-TIMEOUT"),
            QueueError::Deleted => write!(f, "QUEUE-ERROR: queue has been deleted"),
            QueueError::Cancelled => write!(f, "QUEUE-CANCELLED"),
        }
    }
}
impl std::error::Error for QueueError {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum QueueStatus {
    Live,
    Deleted,
}

struct Inner {
    items: VecDeque<Value>,
    status: QueueStatus,
    max: Option<usize>,
    read_waiting: u32,
    write_waiting: u32,
}

/// A timeout in milliseconds: negative means wait forever, zero means poll
/// (§5 cancellation & timeouts).
#[derive(Debug, Clone, Copy)]
pub enum Timeout {
    Forever,
    Poll,
    Millis(u64),
}

impl Timeout {
    pub fn from_millis_signed(ms: i64) -> Self {
        if ms < 0 {
            Timeout::Forever
        } else if ms == 0 {
            Timeout::Poll
        } else {
            Timeout::Millis(ms as u64)
        }
    }
}

pub struct BlockingQueue {
    lock: Mutex<Inner>,
    read_cond: Condvar,
    write_cond: Condvar,
}

impl BlockingQueue {
    pub fn new(max: Option<usize>) -> Self {
        BlockingQueue {
            lock: Mutex::new(Inner {
                items: VecDeque::new(),
                status: QueueStatus::Live,
                max,
                read_waiting: 0,
                write_waiting: 0,
            }),
            read_cond: Condvar::new(),
            write_cond: Condvar::new(),
        }
    }

    fn deadline(timeout: Timeout) -> Option<Instant> {
        match timeout {
            Timeout::Forever | Timeout::Poll => None,
            Timeout::Millis(ms) => Some(Instant::now() + Duration::from_millis(ms)),
        }
    }

    /// Appends to the tail; blocks if a capacity bound is set and reached.
    pub fn push(&self, value: Value, timeout: Timeout) -> Result<(), QueueError> {
        self.push_cancellable(value, timeout, None)
    }

    /// Like [`push`](Self::push), but a set `cancel` flag aborts the wait
    /// with `QueueError::Cancelled` instead of blocking to the timeout.
    pub fn push_cancellable(&self, value: Value, timeout: Timeout, cancel: Option<&AtomicBool>) -> Result<(), QueueError> {
        let mut guard = self.lock.lock();
        let deadline = Self::deadline(timeout);
        loop {
            if guard.status == QueueStatus::Deleted {
                return Err(QueueError::Deleted);
            }
            if is_cancelled(cancel) {
                return Err(QueueError::Cancelled);
            }
            let full = guard.max.map(|m| guard.items.len() >= m).unwrap_or(false);
            if !full {
                break;
            }
            if matches!(timeout, Timeout::Poll) {
                return Err(QueueError::Timeout);
            }
            guard.write_waiting += 1;
            let timed_out = wait_one_slice(&self.write_cond, &mut guard, deadline, cancel);
            guard.write_waiting -= 1;
            if timed_out {
                return Err(QueueError::Timeout);
            }
        }
        guard.items.push_back(value);
        self.read_cond.notify_one();
        Ok(())
    }

    fn wait_for_data<'a>(
        &self,
        mut guard: parking_lot::MutexGuard<'a, Inner>,
        timeout: Timeout,
        cancel: Option<&AtomicBool>,
    ) -> Result<parking_lot::MutexGuard<'a, Inner>, QueueError> {
        let deadline = Self::deadline(timeout);
        loop {
            if !guard.items.is_empty() {
                return Ok(guard);
            }
            if guard.status == QueueStatus::Deleted {
                return Err(QueueError::Deleted);
            }
            if is_cancelled(cancel) {
                return Err(QueueError::Cancelled);
            }
            if matches!(timeout, Timeout::Poll) {
                return Err(QueueError::Timeout);
            }
            guard.read_waiting += 1;
            let timed_out = wait_one_slice(&self.read_cond, &mut guard, deadline, cancel);
            guard.read_waiting -= 1;
            if timed_out {
                return Err(QueueError::Timeout);
            }
        }
    }

    /// Takes the head, blocking if empty.
    pub fn shift(&self, timeout: Timeout) -> Result<Value, QueueError> {
        self.shift_cancellable(timeout, None)
    }

    /// Like [`shift`](Self::shift), but a set `cancel` flag aborts the wait
    /// with `QueueError::Cancelled` instead of blocking to the timeout.
    pub fn shift_cancellable(&self, timeout: Timeout, cancel: Option<&AtomicBool>) -> Result<Value, QueueError> {
        let guard = self.lock.lock();
        let mut guard = self.wait_for_data(guard, timeout, cancel)?;
        let value = guard.items.pop_front().expect("checked non-empty");
        self.write_cond.notify_one();
        Ok(value)
    }

    /// Takes the tail, blocking if empty.
    pub fn pop(&self, timeout: Timeout) -> Result<Value, QueueError> {
        self.pop_cancellable(timeout, None)
    }

    /// Like [`pop`](Self::pop), but a set `cancel` flag aborts the wait
    /// with `QueueError::Cancelled` instead of blocking to the timeout.
    pub fn pop_cancellable(&self, timeout: Timeout, cancel: Option<&AtomicBool>) -> Result<Value, QueueError> {
        let guard = self.lock.lock();
        let mut guard = self.wait_for_data(guard, timeout, cancel)?;
        let value = guard.items.pop_back().expect("checked non-empty");
        self.write_cond.notify_one();
        Ok(value)
    }

    pub fn clear(&self) {
        let mut guard = self.lock.lock();
        guard.items.clear();
        self.write_cond.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks the queue deleted and wakes every waiter, each of which
    /// observes `QueueError::Deleted` (§4.2.3).
    pub fn delete(&self) {
        let mut guard = self.lock.lock();
        guard.status = QueueStatus::Deleted;
        self.read_cond.notify_all();
        self.write_cond.notify_all();
    }

    pub fn is_deleted(&self) -> bool {
        self.lock.lock().status == QueueStatus::Deleted
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map(|c| c.load(Ordering::Acquire)).unwrap_or(false)
}

/// Waits on `cond` for at most one slice: the full remaining time to
/// `deadline` when there's no cancel flag to poll for, else capped at
/// `CANCEL_POLL_INTERVAL` so a cancellable wait keeps re-checking the flag.
/// Returns whether the *overall* deadline (not just this slice) elapsed.
fn wait_one_slice(
    cond: &Condvar,
    guard: &mut parking_lot::MutexGuard<'_, Inner>,
    deadline: Option<Instant>,
    cancel: Option<&AtomicBool>,
) -> bool {
    let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
    match (remaining, cancel) {
        (None, None) => {
            cond.wait(guard);
            false
        }
        (None, Some(_)) => {
            cond.wait_for(guard, CANCEL_POLL_INTERVAL);
            false
        }
        (Some(remaining), None) => cond.wait_for(guard, remaining).timed_out(),
        (Some(remaining), Some(_)) => {
            let slice = remaining.min(CANCEL_POLL_INTERVAL);
            let timed_out = cond.wait_for(guard, slice).timed_out();
            timed_out && Instant::now() >= deadline.expect("deadline is Some in this arm")
        }
    }
}

impl Drop for BlockingQueue {
    fn drop(&mut self) {
        self.delete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn push_then_shift_roundtrip() {
        let q = BlockingQueue::new(None);
        q.push(Value::Int(1), Timeout::Forever).unwrap();
        assert_eq!(q.shift(Timeout::Poll).unwrap(), Value::Int(1));
    }

    #[test]
    fn poll_on_empty_queue_times_out() {
        let q = BlockingQueue::new(None);
        assert_eq!(q.shift(Timeout::Poll).unwrap_err(), QueueError::Timeout);
    }

    #[test]
    fn delete_wakes_blocked_reader_with_error() {
        let q = Arc::new(BlockingQueue::new(None));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.shift(Timeout::Forever));
        // Give the reader a moment to start waiting.
        thread::sleep(Duration::from_millis(50));
        q.delete();
        assert_eq!(handle.join().unwrap().unwrap_err(), QueueError::Deleted);
    }

    #[test]
    fn bounded_push_blocks_until_space() {
        let q = Arc::new(BlockingQueue::new(Some(1)));
        q.push(Value::Int(1), Timeout::Forever).unwrap();
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.push(Value::Int(2), Timeout::Forever));
        thread::sleep(Duration::from_millis(50));
        q.shift(Timeout::Poll).unwrap();
        handle.join().unwrap().unwrap();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancellable_shift_returns_cancelled_once_flag_is_set() {
        let q = Arc::new(BlockingQueue::new(None));
        let cancel = Arc::new(AtomicBool::new(false));
        let q2 = q.clone();
        let cancel2 = cancel.clone();
        let handle = thread::spawn(move || q2.shift_cancellable(Timeout::Forever, Some(&cancel2)));
        // Give the reader a moment to start waiting on an empty queue.
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        cancel.store(true, Ordering::Release);
        assert_eq!(handle.join().unwrap().unwrap_err(), QueueError::Cancelled);
    }

    #[test]
    fn cancellable_shift_still_returns_data_pushed_before_cancellation() {
        let q = BlockingQueue::new(None);
        let cancel = AtomicBool::new(false);
        q.push(Value::Int(7), Timeout::Forever).unwrap();
        assert_eq!(q.shift_cancellable(Timeout::Forever, Some(&cancel)).unwrap(), Value::Int(7));
    }
}
