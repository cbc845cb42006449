//! The live exception object: `ExceptionCore` plus the call stack built
//! lazily as each frame unwinds, plus the `next` chain link (§3, §4.8).

use std::fmt;
use std::sync::Arc;

use strand_value::exception_core::{ExceptionCore, ExceptionKind};
use strand_value::Value;

use crate::stackframe::StackFrame;

/// A live exception. Cheap to clone (`Arc<Vec<StackFrame>>` would be an
/// option, but the call stack is mutated in place as frames unwind, so a
/// plain owned `Vec` living behind the sink's `Arc<Mutex<..>>` layer —
/// see `sink::ExceptionSink` — is simpler and matches how a single
/// in-flight exception is owned by exactly one thread at a time).
#[derive(Debug, Clone)]
pub struct Exception {
    pub core: ExceptionCore,
    pub call_stack: Vec<StackFrame>,
    pub next: Option<Arc<Exception>>,
}

impl Exception {
    pub fn new(core: ExceptionCore) -> Self {
        Exception { core, call_stack: Vec::new(), next: None }
    }

    pub fn system(err: impl Into<String>, desc: impl Into<String>) -> Self {
        Exception::new(ExceptionCore::system(err, desc))
    }

    pub fn user(err: Value, desc: impl Into<String>, arg: Value) -> Self {
        Exception::new(ExceptionCore::user(err, desc, arg))
    }

    pub fn kind(&self) -> ExceptionKind {
        self.core.kind
    }

    /// Push a frame as this exception unwinds through one more evaluator
    /// frame (§4.8: "on each frame unwind, the evaluator pushes a ... entry
    /// onto each live exception in the thread's sink").
    pub fn push_frame(&mut self, frame: StackFrame) {
        self.call_stack.push(frame);
    }

    /// Out-of-memory uses a pre-allocated exception reserved per thread
    /// (§4.8) so raising it never itself allocates.
    pub fn out_of_memory() -> Self {
        Exception::new(ExceptionCore::system("OUT-OF-MEMORY", "memory allocation failed"))
    }

    /// Prints the chain outer-most cause first, matching the top-level
    /// handler's contract (§4.8, §7): "prints the chain in reverse order
    /// (outer-most cause first)".
    pub fn format_chain(&self) -> String {
        let mut chain = Vec::new();
        let mut current = Some(self);
        let mut owned: Vec<Arc<Exception>> = Vec::new();
        while let Some(exc) = current {
            chain.push(exc);
            current = match &exc.next {
                Some(next) => {
                    owned.push(next.clone());
                    Some(owned.last().unwrap().as_ref())
                }
                None => None,
            };
        }
        chain.reverse();
        let mut out = String::new();
        for exc in chain {
            out.push_str(&format!("{}\n", exc));
            for frame in exc.call_stack.iter().rev() {
                out.push_str(&format!(
                    "  in {}{} at {}:{}\n",
                    frame.class.as_deref().map(|c| format!("{}::", c)).unwrap_or_default(),
                    frame.function,
                    frame.location.file,
                    frame.location.start_line,
                ));
            }
        }
        out
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.core.kind, self.core)
    }
}

impl std::error::Error for Exception {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_is_a_system_exception() {
        let exc = Exception::out_of_memory();
        assert_eq!(exc.kind(), ExceptionKind::System);
        assert_eq!(exc.core.err, "OUT-OF-MEMORY");
    }

    #[test]
    fn format_chain_prints_outer_most_cause_first() {
        let inner = Exception::system("INNER", "inner cause");
        let mut outer = Exception::system("OUTER", "outer cause");
        outer.next = Some(Arc::new(inner));
        let rendered = outer.format_chain();
        assert!(rendered.find("INNER").unwrap() < rendered.find("OUTER").unwrap());
    }
}
