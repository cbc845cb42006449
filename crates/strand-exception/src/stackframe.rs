//! Call-stack frame enrichment on unwind (§4.8).

use strand_value::exception_core::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    User,
    Builtin,
    /// Pushed by `rethrow` ahead of the frame where the rethrow occurred.
    Rethrow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub kind: FrameKind,
    pub class: Option<String>,
    pub function: String,
    pub location: SourceLocation,
}

impl StackFrame {
    pub fn new(kind: FrameKind, function: impl Into<String>, location: SourceLocation) -> Self {
        StackFrame { kind, class: None, function: function.into(), location }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn rethrow_marker(location: SourceLocation) -> Self {
        StackFrame { kind: FrameKind::Rethrow, class: None, function: "<rethrow>".to_string(), location }
    }
}
