//! The exception sink: thread-local chain-head that accumulates exceptions
//! raised while executing, rethrow, and assimilate (§4.8).

use std::cell::RefCell;

use crate::exception::Exception;
use crate::stackframe::StackFrame;

/// Raising into an already-empty sink's rethrow, or rethrowing with nothing
/// caught, is a programmer error in the evaluator — there is no `RETHROW`
/// without a live catch binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptySinkError;

impl std::fmt::Display for EmptySinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rethrow with no exception in the current sink")
    }
}

impl std::error::Error for EmptySinkError {}

/// A sink accumulates one or more exceptions raised during a single
/// operation, oldest first. A `TryCatch` block runs its body against a
/// fresh sink; on exit, any accumulated exception is either consumed by the
/// catch body or assimilated into the enclosing sink.
#[derive(Debug, Default)]
pub struct ExceptionSink {
    exceptions: Vec<Exception>,
}

impl ExceptionSink {
    pub fn new() -> Self {
        ExceptionSink { exceptions: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }

    pub fn raise(&mut self, exc: Exception) {
        self.exceptions.push(exc);
    }

    /// Push a stack frame onto every exception currently live in this sink,
    /// called as the evaluator unwinds through one more frame (§4.8).
    pub fn enrich_unwind(&mut self, frame: StackFrame) {
        for exc in &mut self.exceptions {
            exc.push_frame(frame.clone());
        }
    }

    /// Take the most recently raised exception for inspection by a catch
    /// body (`$1` / the catch binding), leaving the sink empty.
    pub fn take_current(&mut self) -> Option<Exception> {
        self.exceptions.pop()
    }

    pub fn current(&self) -> Option<&Exception> {
        self.exceptions.last()
    }

    /// Rethrow: prepend a `Rethrow` frame to the current exception and
    /// leave it raised in this sink. The exception object itself is not
    /// duplicated — it is the same value, now carrying one more frame
    /// (§4.8: "the original exception object is shared").
    pub fn rethrow(&mut self, at: StackFrame) -> Result<(), EmptySinkError> {
        let exc = self.exceptions.last_mut().ok_or(EmptySinkError)?;
        exc.call_stack.push(StackFrame::rethrow_marker(at.location.clone()));
        Ok(())
    }

    /// Merge another sink's exceptions into this one, oldest-overall-first.
    /// Used when catching cross-program-context exceptions (§4.8).
    pub fn assimilate(&mut self, mut other: ExceptionSink) {
        self.exceptions.append(&mut other.exceptions);
    }

    pub fn into_exceptions(self) -> Vec<Exception> {
        self.exceptions
    }
}

thread_local! {
    static CURRENT: RefCell<ExceptionSink> = RefCell::new(ExceptionSink::new());
}

/// Raise into the current thread's sink (§3: "thread-local while
/// executing"). `strand-thread` swaps this out per thread-data frame; until
/// that crate is wired in, this is a single flat per-OS-thread sink.
pub fn raise_current(exc: Exception) {
    CURRENT.with(|sink| sink.borrow_mut().raise(exc));
}

pub fn take_current() -> Option<Exception> {
    CURRENT.with(|sink| sink.borrow_mut().take_current())
}

pub fn current_is_empty() -> bool {
    CURRENT.with(|sink| sink.borrow().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_value::exception_core::SourceLocation;

    #[test]
    fn rethrow_adds_a_marker_frame_without_duplicating() {
        let mut sink = ExceptionSink::new();
        sink.raise(Exception::system("ERR", "desc"));
        sink.rethrow(StackFrame::new(crate::FrameKind::User, "f", SourceLocation::default())).unwrap();
        assert_eq!(sink.exceptions.len(), 1);
        assert_eq!(sink.current().unwrap().call_stack.len(), 1);
    }

    #[test]
    fn rethrow_on_empty_sink_errors() {
        let mut sink = ExceptionSink::new();
        assert!(sink.rethrow(StackFrame::new(crate::FrameKind::User, "f", SourceLocation::default())).is_err());
    }

    #[test]
    fn assimilate_appends_in_order() {
        let mut a = ExceptionSink::new();
        a.raise(Exception::system("A", "a"));
        let mut b = ExceptionSink::new();
        b.raise(Exception::system("B", "b"));
        a.assimilate(b);
        let exceptions = a.into_exceptions();
        assert_eq!(exceptions[0].core.err, "A");
        assert_eq!(exceptions[1].core.err, "B");
    }

    #[test]
    fn thread_local_current_sink_round_trips() {
        assert!(current_is_empty());
        raise_current(Exception::system("X", "x"));
        assert!(!current_is_empty());
        let exc = take_current().unwrap();
        assert_eq!(exc.core.err, "X");
        assert!(current_is_empty());
    }
}
