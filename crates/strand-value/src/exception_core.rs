//! The minimal exception payload (§3, §8).
//!
//! This is deliberately the smallest type that a `Value` needs to carry:
//! kind, code, description, argument and source location. The thread-local
//! exception *sink* and the call-stack enrichment machinery built on top of
//! it live in the `strand-exception` crate, which depends on this one — not
//! the other way around, so that `Value::Callable::invoke` here can return
//! a concrete error type without this crate depending on the sink.

use std::fmt;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    System,
    User,
}

/// Source location attached to an exception (§3 Exception).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub file: String,
    pub source: String,
    pub offset: usize,
    pub start_line: u32,
    pub end_line: u32,
}

/// `{kind, err, desc, arg, location}` without the call stack (§3).
#[derive(Debug, Clone)]
pub struct ExceptionCore {
    pub kind: ExceptionKind,
    pub err: String,
    pub desc: String,
    pub arg: Value,
    pub location: SourceLocation,
}

impl ExceptionCore {
    pub fn system(err: impl Into<String>, desc: impl Into<String>) -> Self {
        ExceptionCore {
            kind: ExceptionKind::System,
            err: err.into(),
            desc: desc.into(),
            arg: Value::Nothing,
            location: SourceLocation::default(),
        }
    }

    pub fn user(err: Value, desc: impl Into<String>, arg: Value) -> Self {
        let err_str = match &err {
            Value::String(s) => s.as_str().to_string(),
            other => other.to_display_string(),
        };
        ExceptionCore {
            kind: ExceptionKind::User,
            err: err_str,
            desc: desc.into(),
            arg,
            location: SourceLocation::default(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for ExceptionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.err, self.desc)
    }
}

impl std::error::Error for ExceptionCore {}
