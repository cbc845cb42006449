//! Evaluator-specific error conditions that don't originate from a lower
//! crate (§4.5, §7 error codes).

use std::fmt;

use strand_ast::SourceLocation;
use strand_exception::Exception;
use strand_value::ExceptionCore;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    DivisionByZero,
    UnresolvedFunction(String),
    NotAnObject(&'static str),
    NotIterable(&'static str),
    InvalidRegexPayload(&'static str),
    InvalidDateOperation(&'static str),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "DIVISION-BY-ZERO: division by zero"),
            EvalError::UnresolvedFunction(name) => write!(f, "UNRESOLVED-FUNCTION: '{}' is not declared", name),
            EvalError::NotAnObject(ctx) => write!(f, "NOT-AN-OBJECT: {} requires an object value", ctx),
            EvalError::NotIterable(ctx) => write!(f, "NOT-ITERABLE: {} requires a list or iterable value", ctx),
            EvalError::InvalidRegexPayload(ctx) => write!(f, "INVALID-REGEX: {} was not given a compiled pattern", ctx),
            EvalError::InvalidDateOperation(ctx) => write!(f, "INVALID-DATE-ARITHMETIC: {} mixes incompatible date operands", ctx),
        }
    }
}
impl std::error::Error for EvalError {}

impl From<EvalError> for ExceptionCore {
    fn from(e: EvalError) -> Self {
        let err = match &e {
            EvalError::DivisionByZero => "DIVISION-BY-ZERO",
            EvalError::UnresolvedFunction(_) => "UNRESOLVED-FUNCTION",
            EvalError::NotAnObject(_) => "NOT-AN-OBJECT",
            EvalError::NotIterable(_) => "NOT-ITERABLE",
            EvalError::InvalidRegexPayload(_) => "INVALID-REGEX",
            EvalError::InvalidDateOperation(_) => "INVALID-DATE-ARITHMETIC",
        };
        ExceptionCore::system(err, e.to_string())
    }
}

/// Lifts any error convertible to `ExceptionCore` into a full `Exception`,
/// stamping the evaluator's current source location onto it (§3 Exception,
/// §4.8: locations accumulate as a frame unwinds).
pub fn to_exception<E: Into<ExceptionCore>>(err: E, location: Option<&SourceLocation>) -> Exception {
    let core = err.into().with_location(location.cloned().unwrap_or_default());
    Exception::new(core)
}
