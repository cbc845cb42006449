//! Minimal AST surface standing in for the (out of scope) parser front-end
//! (§4.12/C12).
//!
//! The lexer/grammar front end is not part of this core; what the evaluator
//! (`strand-eval`) and resolver (`strand-resolver`) actually consume is this
//! small `Expr`/`Stmt` node set, built either by a real parser living outside
//! this crate or, for tests and the CLI demo, by the ergonomic free
//! functions in `builder`.
//!
//! Nodes are owned trees (`Box<Expr>`, not arena references): AST values are
//! shared across OS threads per §5 (imported bindings, `Reference` capture,
//! signal-handler re-entry), which requires `'static` ownership rather than
//! a borrowed arena tied to a single parse pass.

pub mod builder;
pub mod expr;
pub mod stmt;

pub use expr::{BinaryOp, CompoundOp, Expr, ExprKind, FunctionalOp, LValuePath, UnaryOp};
pub use stmt::{CaseValue, SortDirection, Stmt, StmtKind, SwitchCase};
pub use strand_value::exception_core::SourceLocation;
