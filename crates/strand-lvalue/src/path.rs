//! A fully-evaluated lvalue path: the root storage cell plus zero or more
//! hash-key/list-index steps into it (§4.3).
//!
//! The evaluator walks the AST's lvalue expression (`strand_ast::LValuePath`)
//! and evaluates any key/index sub-expressions itself — that keeps this
//! crate from depending on the evaluator to resolve one, avoiding a
//! dependency cycle — then hands the result here as a `ResolvedPath`.

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRoot {
    Local(String),
    Closure(String),
    Global(String),
    /// A member access rooted in the current `self` object.
    Member(String),
}

// A `Member` step mid-path (e.g. `a.b.c` where `b` is itself an object) is
// deliberately not supported here: each object hop needs its own lock
// acquired in the deterministic pointer-ascending order §4.3 describes, so
// the evaluator resolves such chains as a fresh `LValueHelper` per object
// hop rather than a single helper walking through nested nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStep {
    HashKey(String),
    ListIndex(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub root: ResolvedRoot,
    pub steps: Vec<ResolvedStep>,
}

impl ResolvedPath {
    pub fn root(root: ResolvedRoot) -> Self {
        ResolvedPath { root, steps: Vec::new() }
    }

    pub fn with_step(mut self, step: ResolvedStep) -> Self {
        self.steps.push(step);
        self
    }
}
