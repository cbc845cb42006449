//! Locate-and-lock protocol for lvalue expressions, and by-reference
//! argument passing (§4.3/C3).
//!
//! An lvalue expression names a storage cell: a local, a closure-captured
//! variable, a global, or a chain of hash-key/list-index/member accesses
//! rooted in one of those. [`LValueHelper`] resolves such a path once,
//! holding whatever object locks the path touches for its own lifetime, and
//! exposes the small set of operations the evaluator needs: read, assign,
//! copy-on-write, take, and the typed compound-assignment fast paths.

pub mod context;
pub mod helper;
pub(crate) mod located;
pub mod path;
pub mod reference;
pub mod scope;

pub use context::LValueContext;
pub use helper::{LValueError, LValueHelper};
pub use path::{ResolvedPath, ResolvedRoot, ResolvedStep};
pub use reference::Reference;
pub use scope::{new_cell, Cell, Scope, ScopeStack};
