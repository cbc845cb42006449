//! Exceptions, call-stack enrichment and exception sinks (§4.8/C8).
//!
//! `strand_value::exception_core::ExceptionCore` carries the bare
//! `{kind, err, desc, arg, location}` payload so that `Value` can reference
//! it without depending on this crate. This crate adds the call-stack list,
//! the exception chain (`next`), and the thread-local sink that the
//! evaluator raises into and catch blocks drain.

pub mod exception;
pub mod sink;
pub mod stackframe;

pub use exception::Exception;
pub use sink::ExceptionSink;
pub use stackframe::{FrameKind, StackFrame};
