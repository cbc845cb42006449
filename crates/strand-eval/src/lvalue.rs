//! Walks `strand_ast::LValuePath` into `strand_lvalue` lookups (§4.3, §4.5).
//!
//! `strand_lvalue::ResolvedRoot::Member` only ever roots at the evaluator's
//! *current* `self` — there's no nested-member-chain support at that layer,
//! by design (see `strand_lvalue::path`'s comment: each object hop needs its
//! own lock acquired in pointer order). `self.x` itself is just the ordinary
//! case of that: a method call binds the local variable `self` to the
//! receiving object, so `self.x` is `Member { base: Local("self"), name: "x" }`
//! like any other `base.field` access. Resolving a `Member` here therefore
//! always reads `base` down to a `Value::Object` first, then re-roots
//! against a small scoped context so `strand_lvalue` only ever sees
//! `ResolvedRoot::Member` paired with the right object, whether that object
//! is `self` or some other reachable object.

use std::sync::Arc;

use strand_ast::{Expr, LValuePath};
use strand_exception::Exception;
use strand_lvalue::{LValueContext, LValueHelper, ResolvedPath, ResolvedRoot, ResolvedStep};
use strand_value::{QObject, Value};

use crate::error::{to_exception, EvalError};

/// What an evaluator needs to supply beyond plain variable lookup: the
/// ability to evaluate an arbitrary sub-expression (a hash key, a list
/// index) down to a `Value`. Kept separate from `LValueContext` so that
/// trait stays usable by `strand-lvalue`'s own tests without an evaluator.
pub trait PathEval: LValueContext {
    fn eval_to_value(&mut self, expr: &Expr) -> Result<Value, Exception>;
}

enum RootSpec {
    Plain(ResolvedRoot),
    Object(Arc<QObject>, String),
}

/// A context whose only job is to stand in for `self` while resolving one
/// object hop of a member-access chain.
struct ObjectScopedCtx {
    object: Arc<QObject>,
}

impl LValueContext for ObjectScopedCtx {
    fn local(&self, _name: &str) -> Option<strand_lvalue::Cell> {
        None
    }
    fn closure(&self, _name: &str) -> Option<strand_lvalue::Cell> {
        None
    }
    fn global(&self, _name: &str) -> Option<strand_lvalue::Cell> {
        None
    }
    fn current_self(&self) -> Option<Arc<QObject>> {
        Some(self.object.clone())
    }
}

fn resolve_root_and_steps<C: PathEval>(
    ctx: &mut C,
    path: &LValuePath,
) -> Result<(RootSpec, Vec<ResolvedStep>), Exception> {
    match path {
        LValuePath::Local(name) => Ok((RootSpec::Plain(ResolvedRoot::Local(name.clone())), Vec::new())),
        LValuePath::Closure(name) => Ok((RootSpec::Plain(ResolvedRoot::Closure(name.clone())), Vec::new())),
        LValuePath::Global(name) => Ok((RootSpec::Plain(ResolvedRoot::Global(name.clone())), Vec::new())),
        LValuePath::Member { base, name } => match read_path(ctx, base)? {
            Value::Object(obj) => Ok((RootSpec::Object(obj, name.clone()), Vec::new())),
            _ => Err(to_exception(EvalError::NotAnObject("member access"), None)),
        },
        LValuePath::HashKey { base, key } => {
            let (root, mut steps) = resolve_root_and_steps(ctx, base)?;
            let key_value = ctx.eval_to_value(key)?;
            steps.push(ResolvedStep::HashKey(key_value.as_string().as_str().into_owned()));
            Ok((root, steps))
        }
        LValuePath::ListIndex { base, index } => {
            let (root, mut steps) = resolve_root_and_steps(ctx, base)?;
            let index_value = ctx.eval_to_value(index)?;
            steps.push(ResolvedStep::ListIndex(index_value.as_int()));
            Ok((root, steps))
        }
    }
}

/// Resolves `path` and locks it for exactly the one operation the caller is
/// about to perform through the returned `LValueHelper`.
pub fn locate<C: PathEval>(ctx: &mut C, path: &LValuePath) -> Result<LValueHelper, Exception> {
    let (root, steps) = resolve_root_and_steps(ctx, path)?;
    match root {
        RootSpec::Plain(root) => {
            let resolved = ResolvedPath { root, steps };
            LValueHelper::locate(&*ctx, &resolved).map_err(|e| to_exception(e, None))
        }
        RootSpec::Object(obj, name) => {
            let resolved = ResolvedPath { root: ResolvedRoot::Member(name), steps };
            let scoped = ObjectScopedCtx { object: obj };
            LValueHelper::locate(&scoped, &resolved).map_err(|e| to_exception(e, None))
        }
    }
}

/// Reads the current value at `path` without holding it locked afterward —
/// used both as a general rvalue read of an lvalue expression, and to
/// resolve the object at each hop of a member-access chain.
pub fn read_path<C: PathEval>(ctx: &mut C, path: &LValuePath) -> Result<Value, Exception> {
    locate(ctx, path)?.current_value().map_err(|e| to_exception(e, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_ast::builder;
    use strand_lvalue::ScopeStack;

    struct TestCtx {
        scope: std::cell::RefCell<ScopeStack>,
    }

    impl LValueContext for TestCtx {
        fn local(&self, name: &str) -> Option<strand_lvalue::Cell> {
            self.scope.borrow().lookup(name)
        }
        fn closure(&self, _name: &str) -> Option<strand_lvalue::Cell> {
            None
        }
        fn global(&self, _name: &str) -> Option<strand_lvalue::Cell> {
            None
        }
        fn current_self(&self) -> Option<Arc<QObject>> {
            None
        }
    }

    impl PathEval for TestCtx {
        fn eval_to_value(&mut self, expr: &Expr) -> Result<Value, Exception> {
            match &expr.kind {
                strand_ast::ExprKind::Literal(v) => Ok(v.clone()),
                _ => panic!("test context only evaluates literals"),
            }
        }
    }

    #[test]
    fn resolves_a_nested_list_index_path() {
        let mut scope = ScopeStack::new();
        scope.declare("xs", Value::list(vec![Value::Int(10), Value::Int(20)]));
        let mut ctx = TestCtx { scope: std::cell::RefCell::new(scope) };
        let path = builder::list_index_path(LValuePath::Local("xs".to_string()), builder::lit_int(1));
        let helper = locate(&mut ctx, &path).unwrap();
        assert_eq!(helper.current_value().unwrap(), Value::Int(20));
    }

    #[test]
    fn member_access_requires_an_object() {
        let mut scope = ScopeStack::new();
        scope.declare("notobj", Value::Int(1));
        let mut ctx = TestCtx { scope: std::cell::RefCell::new(scope) };
        let path = builder::member_path(LValuePath::Local("notobj".to_string()), "field");
        assert!(locate(&mut ctx, &path).is_err());
    }
}
