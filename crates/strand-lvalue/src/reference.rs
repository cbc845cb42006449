//! `Reference`: a captured lvalue path plus the program context needed to
//! re-resolve it, even from a different thread (§4.3, §3 invariant 4).
//!
//! Where [`crate::LValueHelper`] is transient (resolved, used once, dropped
//! within a single evaluator step), a `Reference` is a `Value` payload: it
//! can be stored, passed by value into another call frame, or handed across
//! a `thread_start` boundary, and must still resolve against the same
//! underlying cell or object member whenever it is later read or assigned.

use std::fmt;
use std::sync::Arc;

use strand_value::{ExceptionCore, ProgramContext, ReferenceTarget, Value};

use crate::context::LValueContext;
use crate::located::{Located, RootHandle};
use crate::path::{ResolvedPath, ResolvedRoot};
use crate::LValueError;

pub struct Reference {
    located: Located,
    program: Arc<dyn ProgramContext>,
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference").field("program_id", &self.program.program_id()).finish()
    }
}

impl Reference {
    /// Resolve `path` against `ctx` once, the same root-resolution
    /// `LValueHelper::locate` does, and capture the result as an owned
    /// handle (§4.3: "(a) the root storage cell or object member, (b) any
    /// nested hash-key/list-index steps, (c) the program context").
    pub fn capture(
        ctx: &dyn LValueContext,
        path: &ResolvedPath,
        program: Arc<dyn ProgramContext>,
    ) -> Result<Self, LValueError> {
        let root = match &path.root {
            ResolvedRoot::Local(name) => {
                RootHandle::Cell(ctx.local(name).ok_or_else(|| LValueError::UnresolvedVariable(name.clone()))?)
            }
            ResolvedRoot::Closure(name) => {
                RootHandle::Cell(ctx.closure(name).ok_or_else(|| LValueError::UnresolvedVariable(name.clone()))?)
            }
            ResolvedRoot::Global(name) => {
                RootHandle::Cell(ctx.global(name).ok_or_else(|| LValueError::UnresolvedVariable(name.clone()))?)
            }
            ResolvedRoot::Member(name) => {
                let object = ctx.current_self().ok_or(LValueError::NoCurrentSelf)?;
                RootHandle::Member { object, name: name.clone() }
            }
        };
        Ok(Reference { located: Located { root, steps: path.steps.clone() }, program })
    }

    pub fn program_context(&self) -> Arc<dyn ProgramContext> {
        self.program.clone()
    }
}

impl ReferenceTarget for Reference {
    fn get(&self) -> Result<Value, ExceptionCore> {
        self.located.with_mut(|v| v.clone()).map_err(ExceptionCore::from)
    }

    fn assign(&self, new_value: Value) -> Result<Value, ExceptionCore> {
        self.located
            .with_mut(|v| std::mem::replace(v, new_value))
            .map_err(ExceptionCore::from)
    }

    fn lock_order_key(&self) -> usize {
        self.located.lock_order_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ResolvedPath;
    use crate::scope::{Cell, ScopeStack};
    use strand_value::QObject;

    #[derive(Debug)]
    struct TestProgram;
    impl ProgramContext for TestProgram {
        fn program_id(&self) -> u64 {
            1
        }
    }

    struct TestCtx {
        scope: ScopeStack,
    }
    impl LValueContext for TestCtx {
        fn local(&self, name: &str) -> Option<Cell> {
            self.scope.lookup(name)
        }
        fn closure(&self, _name: &str) -> Option<Cell> {
            None
        }
        fn global(&self, _name: &str) -> Option<Cell> {
            None
        }
        fn current_self(&self) -> Option<Arc<QObject>> {
            None
        }
    }

    #[test]
    fn capture_then_get_and_assign() {
        let mut scope = ScopeStack::new();
        scope.declare("x", Value::Int(1));
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("x".to_string()));
        let reference = Reference::capture(&ctx, &path, Arc::new(TestProgram)).unwrap();
        assert_eq!(reference.get().unwrap(), Value::Int(1));
        let old = reference.assign(Value::Int(2)).unwrap();
        assert_eq!(old, Value::Int(1));
        assert_eq!(reference.get().unwrap(), Value::Int(2));
    }

    #[test]
    fn capture_unresolved_local_errors() {
        let ctx = TestCtx { scope: ScopeStack::new() };
        let path = ResolvedPath::root(ResolvedRoot::Local("missing".to_string()));
        assert!(matches!(Reference::capture(&ctx, &path, Arc::new(TestProgram)), Err(LValueError::UnresolvedVariable(_))));
    }
}
