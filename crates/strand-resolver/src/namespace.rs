//! Namespace: children of a `Program`, holding pending and committed
//! classes/constants/child namespaces (§4.4). Grounded on the original's
//! pending/committed namespace split (`Namespace::pendClassList` /
//! `classList`, `pendConstant` / `constant`) — everything added during a
//! parse lands in the pending side until `commit` promotes it, or
//! `rollback` discards it.

use std::collections::HashMap;
use std::sync::Arc;

use strand_ast::Expr;
use strand_value::Value;

use crate::class::Class;
use crate::error::ResolveError;

/// Evaluates a constant's initializer expression. Implemented by the
/// evaluator crate so this one never needs to depend back on it (the same
/// capability-trait split used for `Callable`/`ProgramContext`). A runtime
/// exception raised while evaluating (e.g. a failed builtin call) should be
/// reported back as `ResolveError::EvaluationFailed`.
pub trait ConstantEvaluator {
    fn eval_constant_expr(&mut self, expr: &Expr, ctx: &mut dyn ConstantLookup) -> Result<Value, ResolveError>;
}

/// What a constant initializer's evaluator needs back: the ability to
/// resolve another (possibly still-pending) constant by name, triggering
/// its own evaluation on first reference and detecting cycles.
pub trait ConstantLookup {
    fn resolve(&mut self, evaluator: &mut dyn ConstantEvaluator, name: &str) -> Result<Value, ResolveError>;
}

#[derive(Default, Clone)]
pub struct Namespace {
    pub name: String,
    constants: HashMap<String, Value>,
    pending_constants: HashMap<String, Expr>,
    classes: HashMap<String, Arc<Class>>,
    pending_classes: HashMap<String, Arc<Class>>,
    children: HashMap<String, Namespace>,
    pending_children: HashMap<String, Namespace>,
    /// Names currently mid-evaluation, for `CONSTANT-CYCLE` detection.
    in_progress: Vec<String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Namespace { name: name.into(), ..Default::default() }
    }

    /// Pass 1: add a constant declaration to this namespace's pending set.
    /// Duplicate detection checks pending, committed, and committed child
    /// namespaces that would shadow the new name (§4.4).
    pub fn declare_constant(&mut self, name: impl Into<String>, initializer: Expr) -> Result<(), ResolveError> {
        let name = name.into();
        self.check_available(&name)?;
        self.pending_constants.insert(name, initializer);
        Ok(())
    }

    pub fn declare_class(&mut self, name: impl Into<String>, class: Arc<Class>) -> Result<(), ResolveError> {
        let name = name.into();
        self.check_available(&name)?;
        self.pending_classes.insert(name, class);
        Ok(())
    }

    /// Namespaces are mergeable across re-declarations (the original's
    /// `assimilate`), not duplicate-rejected: reopening `namespace Foo { }`
    /// twice in the same parse returns the same pending child, seeded from
    /// whatever was already committed under that name so duplicate
    /// detection inside it still sees prior committed members.
    pub fn declare_namespace(&mut self, name: impl Into<String>) -> &mut Namespace {
        let name = name.into();
        if !self.pending_children.contains_key(&name) {
            let shell = self.children.get(&name).cloned().unwrap_or_else(|| Namespace::new(name.clone()));
            self.pending_children.insert(name.clone(), shell);
        }
        self.pending_children.get_mut(&name).expect("just inserted")
    }

    fn check_available(&self, name: &str) -> Result<(), ResolveError> {
        let taken = self.pending_constants.contains_key(name)
            || self.constants.contains_key(name)
            || self.pending_classes.contains_key(name)
            || self.classes.contains_key(name)
            || self.children.contains_key(name)
            || self.pending_children.contains_key(name);
        if taken {
            Err(ResolveError::DuplicateDeclaration { scope: self.name.clone(), name: name.to_string() })
        } else {
            Ok(())
        }
    }

    pub fn find_class(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(name).cloned().or_else(|| self.children.values().find_map(|c| c.find_class(name)))
    }

    pub fn find_child(&self, name: &str) -> Option<&Namespace> {
        self.children.get(name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Namespace> {
        self.children.get_mut(name)
    }

    /// Walk `current class -> enclosing namespace -> parent namespace ->
    /// root` is the caller's job (the scope chain is a property of where a
    /// reference appears, not of one namespace); this just exposes a single
    /// committed constant lookup at this level.
    pub fn committed_constant(&self, name: &str) -> Option<Value> {
        self.constants.get(name).cloned()
    }

    /// Resolve and cache every pending constant in this namespace, then
    /// recurse into pending child namespaces. Evaluation order across
    /// independent constants doesn't matter; cross-references are resolved
    /// on demand via [`ConstantLookup::resolve`].
    pub fn resolve_pending_constants(&mut self, evaluator: &mut dyn ConstantEvaluator) -> Result<(), ResolveError> {
        let names: Vec<String> = self.pending_constants.keys().cloned().collect();
        for name in names {
            self.resolve(evaluator, &name)?;
        }
        let child_names: Vec<String> = self.pending_children.keys().cloned().collect();
        for name in child_names {
            if let Some(child) = self.pending_children.get_mut(&name) {
                child.resolve_pending_constants(evaluator)?;
            }
        }
        Ok(())
    }

    /// Promote every pending declaration (and pending child namespaces,
    /// recursively) into committed state. Only called once the whole
    /// program's pass 1 + pass 2 completed without error.
    pub fn commit(&mut self) {
        for (name, value) in self.pending_constants.drain() {
            self.constants.insert(name, value);
        }
        for (name, class) in self.pending_classes.drain() {
            self.classes.insert(name, class);
        }
        for (name, mut child) in self.pending_children.drain() {
            child.commit();
            self.children.insert(name, child);
        }
    }

    /// Discard all pending state at and below this namespace, leaving
    /// committed state exactly as it was (§4.4 rollback guarantee).
    pub fn rollback(&mut self) {
        self.pending_constants.clear();
        self.pending_classes.clear();
        self.pending_children.clear();
        self.in_progress.clear();
        for child in self.children.values_mut() {
            child.rollback();
        }
    }
}

impl ConstantLookup for Namespace {
    fn resolve(&mut self, evaluator: &mut dyn ConstantEvaluator, name: &str) -> Result<Value, ResolveError> {
        if let Some(v) = self.constants.get(name) {
            return Ok(v.clone());
        }
        if self.in_progress.contains(&name.to_string()) {
            let mut chain = self.in_progress.clone();
            chain.push(name.to_string());
            return Err(ResolveError::ConstantCycle { chain });
        }
        let Some(expr) = self.pending_constants.get(name).cloned() else {
            return Err(ResolveError::UnresolvedReference(name.to_string()));
        };
        self.in_progress.push(name.to_string());
        let result = evaluator.eval_constant_expr(&expr, self);
        self.in_progress.pop();
        let value = result?;
        self.pending_constants.remove(name);
        self.constants.insert(name.to_string(), value.clone());
        Ok(value)
    }
}
