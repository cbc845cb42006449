//! Two-phase namespace/class/constant resolver with pending/commit/rollback
//! (§4.4/C4).
//!
//! Parsing a program body happens under a single program-wide parse mutex in
//! two passes: pass 1 (structural intake) adds every declaration to a
//! **pending** set and flags duplicates; pass 2 (resolve & initialize)
//! evaluates pending constant initializers and walks the scope chain for
//! unresolved name references. If pass 1 or pass 2 raised any error, the
//! pending state for the whole program is discarded; otherwise it is
//! promoted to committed state atomically.

pub mod class;
pub mod error;
pub mod namespace;
pub mod program;

pub use class::{Class, DomainMask};
pub use error::ResolveError;
pub use namespace::Namespace;
pub use program::Program;
