//! Capability traits implemented by higher crates and stored behind a
//! `Value` variant (§9: "polymorphism ... expressed as a capability set
//! implemented per variant").

use std::fmt;
use std::sync::Arc;

use crate::exception_core::ExceptionCore;
use crate::value::Value;

/// An opaque handle to whatever "program" container owns a callable or a
/// captured reference. Defined here (rather than in the resolver crate, the
/// natural home for `Program`) purely to break the dependency cycle: the
/// resolver implements this trait on its `Program` type and hands out
/// `Arc<dyn ProgramContext>` handles that this crate's `Value` can carry
/// without depending on the resolver crate.
pub trait ProgramContext: Send + Sync + fmt::Debug {
    /// Stable identity used by `Reference` to assert it always resolves
    /// against the same program context (§3 invariant 4).
    fn program_id(&self) -> u64;
}

/// The callable capability behind `Value::CallReference` (§6: "any
/// `CallReference` variant provides `invoke(args_list) -> Value` and
/// `program_context() -> program_handle`").
pub trait Callable: Send + Sync + fmt::Debug {
    fn invoke(&self, args: Vec<Value>) -> Result<Value, ExceptionCore>;
    fn program_context(&self) -> Arc<dyn ProgramContext>;
    fn name(&self) -> &str;
}
