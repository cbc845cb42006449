//! Parse-time errors raised during structural intake or resolve/initialize
//! (§4.4).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Pass 1: the name is already pending or committed in the same scope,
    /// or shadows a committed child namespace.
    DuplicateDeclaration { scope: String, name: String },
    /// Pass 2: a constant's initializer (transitively) references itself.
    ConstantCycle { chain: Vec<String> },
    /// Pass 2: no local/enclosing-namespace/parent-namespace/root match for
    /// a name reference.
    UnresolvedReference(String),
    /// A scoped name (`A::B::x`) whose prefix doesn't resolve to a
    /// namespace or class.
    UnresolvedScope(String),
    /// A constant initializer's evaluation itself raised an exception
    /// (e.g. a builtin call that failed) rather than a resolution error.
    EvaluationFailed(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::DuplicateDeclaration { scope, name } => {
                write!(f, "DUPLICATE-DECLARATION: '{}' already declared in '{}'", name, scope)
            }
            ResolveError::ConstantCycle { chain } => {
                write!(f, "CONSTANT-CYCLE: {}", chain.join(" -> "))
            }
            ResolveError::UnresolvedReference(name) => {
                write!(f, "UNRESOLVED-REFERENCE: '{}' not found in scope chain", name)
            }
            ResolveError::UnresolvedScope(name) => {
                write!(f, "UNRESOLVED-SCOPE: '{}' does not resolve to a namespace or class", name)
            }
            ResolveError::EvaluationFailed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ResolveError> for strand_value::ExceptionCore {
    fn from(e: ResolveError) -> Self {
        let err = match &e {
            ResolveError::DuplicateDeclaration { .. } => "DUPLICATE-DECLARATION",
            ResolveError::ConstantCycle { .. } => "CONSTANT-CYCLE",
            ResolveError::UnresolvedReference(_) => "UNRESOLVED-REFERENCE",
            ResolveError::UnresolvedScope(_) => "UNRESOLVED-SCOPE",
            ResolveError::EvaluationFailed(_) => "CONSTANT-INIT-FAILED",
        };
        strand_value::ExceptionCore::system(err, e.to_string())
    }
}
