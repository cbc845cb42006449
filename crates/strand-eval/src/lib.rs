//! Tree-walking evaluator: operators, control flow, and lazy functional
//! iteration over the `strand-ast` node set (§4.5/§4.6/C5+C6).
//!
//! This crate is the one place that ties every lower crate together: it
//! walks `strand_ast::LValuePath` into `strand_lvalue::ResolvedPath` (the
//! lvalue crate never depends on the AST), dispatches `Call` against a
//! registered [`strand_value::Callable`], and turns lower-crate error types
//! into `strand_exception::Exception` at the point they cross back into
//! evaluation.

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod implicit;
pub mod lvalue;
pub mod value_ops;

pub use error::EvalError;
pub use evaluator::{Evaluator, Flow};
pub use functions::FunctionTable;
