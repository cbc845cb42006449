//! Statement nodes (§4.12).

use crate::expr::{Expr, LValuePath};
use crate::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    If { cond: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>> },
    /// Iterates a list, a single value (one iteration), or an iterator
    /// object; if `source` is itself an lvalue, each element is re-assigned
    /// back through it after the body runs (§4.5).
    Foreach { binding: String, source: Expr, source_lvalue: Option<LValuePath>, body: Vec<Stmt> },
    /// `context`/`subcontext` (§4.5): iterate a table-like source with an
    /// optional `where` filter and an optional (mutually exclusive) sort
    /// key/direction.
    Context { source: Expr, where_filter: Option<Expr>, sort_key: Option<(Expr, SortDirection)>, body: Vec<Stmt> },
    Switch { scrutinee: Expr, cases: Vec<SwitchCase>, default: Option<Vec<Stmt>> },
    Throw { err: Expr, desc: Expr, arg: Option<Expr> },
    TryCatch { body: Vec<Stmt>, catch_binding: Option<String>, catch_body: Vec<Stmt> },
    Return(Option<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    Value(Expr),
    Relational(crate::expr::BinaryOp, Expr),
    Regex(strand_value::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: CaseValue,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Option<SourceLocation>,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt { kind, location: None }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}
