//! `Program`: the root namespace, global variables, and per-thread data
//! table behind one running script context (§4.4, §4.9). Implements
//! [`strand_value::ProgramContext`] so a captured `Reference` or
//! `CallReference` can carry an opaque handle back to it without
//! `strand-value` depending on this crate.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use strand_lvalue::{new_cell, Cell};
use strand_value::{ProgramContext, Value};

use crate::class::DomainMask;
use crate::namespace::{ConstantEvaluator, Namespace};
use crate::ResolveError;

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Per-thread local data exposed to `get_thread_data`/`save_thread_data`
/// (§4.9): one hash per live thread slot, keyed by the slot id `strand-thread`
/// hands out.
#[derive(Default)]
struct ThreadData {
    slots: HashMap<u64, HashMap<String, Value>>,
}

pub struct Program {
    id: u64,
    /// Single program-wide parse lock (§4.4: "atomically promote all
    /// pending to committed (single mutex over the parse state)").
    root: Mutex<Namespace>,
    globals: Mutex<HashMap<String, Cell>>,
    thread_data: Mutex<ThreadData>,
    restricted_domains: DomainMask,
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").field("id", &self.id).finish()
    }
}

impl Program {
    pub fn new() -> Arc<Program> {
        Self::with_restrictions(DomainMask::DEFAULT)
    }

    /// A sandboxed program that refuses to commit any class/method whose
    /// domain mask intersects `forbidden` (e.g. a restricted-mode embed
    /// that disallows `QDOM_THREAD_CONTROL`-equivalent functionality).
    pub fn with_restrictions(forbidden: DomainMask) -> Arc<Program> {
        Arc::new(Program {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            root: Mutex::new(Namespace::new("")),
            globals: Mutex::new(HashMap::new()),
            thread_data: Mutex::new(ThreadData::default()),
            restricted_domains: forbidden,
        })
    }

    pub fn restricted_domains(&self) -> DomainMask {
        self.restricted_domains
    }

    /// Run `f` against the root namespace under the program-wide parse
    /// lock. Used for pass 1 structural intake (`declare_*` calls).
    pub fn with_root<R>(&self, f: impl FnOnce(&mut Namespace) -> R) -> R {
        f(&mut self.root.lock())
    }

    /// Pass 2 + commit/rollback (§4.4): resolve every pending constant; if
    /// that raised no error, promote pending to committed everywhere,
    /// otherwise discard all pending state and leave committed state
    /// untouched.
    pub fn commit(&self, evaluator: &mut dyn ConstantEvaluator) -> Result<(), ResolveError> {
        let mut root = self.root.lock();
        match root.resolve_pending_constants(evaluator) {
            Ok(()) => {
                root.commit();
                Ok(())
            }
            Err(e) => {
                root.rollback();
                Err(e)
            }
        }
    }

    pub fn declare_global(&self, name: &str, initial: Value) -> Cell {
        self.globals.lock().entry(name.to_string()).or_insert_with(|| new_cell(initial)).clone()
    }

    pub fn global(&self, name: &str) -> Option<Cell> {
        self.globals.lock().get(name).cloned()
    }

    /// Called once per spawned thread (`strand-thread`) to give it its own
    /// slot in the thread-data table.
    pub fn allocate_thread_slot(&self, thread_id: u64) {
        self.thread_data.lock().slots.entry(thread_id).or_default();
    }

    pub fn free_thread_slot(&self, thread_id: u64) {
        self.thread_data.lock().slots.remove(&thread_id);
    }

    pub fn get_thread_data(&self, thread_id: u64, key: &str) -> Option<Value> {
        self.thread_data.lock().slots.get(&thread_id).and_then(|h| h.get(key).cloned())
    }

    pub fn save_thread_data(&self, thread_id: u64, key: &str, value: Value) {
        self.thread_data.lock().slots.entry(thread_id).or_default().insert(key.to_string(), value);
    }
}

impl ProgramContext for Program {
    fn program_id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_ast::builder::lit_int;

    struct EchoEvaluator;
    impl ConstantEvaluator for EchoEvaluator {
        fn eval_constant_expr(
            &mut self,
            expr: &strand_ast::Expr,
            _ctx: &mut dyn crate::namespace::ConstantLookup,
        ) -> Result<Value, ResolveError> {
            match &expr.kind {
                strand_ast::ExprKind::Literal(v) => Ok(v.clone()),
                _ => Ok(Value::Nothing),
            }
        }
    }

    #[test]
    fn two_programs_get_distinct_ids() {
        let a = Program::new();
        let b = Program::new();
        assert_ne!(a.program_id(), b.program_id());
    }

    #[test]
    fn global_declared_once_is_shared() {
        let program = Program::new();
        let cell_a = program.declare_global("x", Value::Int(1));
        let cell_b = program.declare_global("x", Value::Int(99));
        *cell_a.lock() = Value::Int(42);
        assert_eq!(*cell_b.lock(), Value::Int(42));
    }

    #[test]
    fn commit_promotes_constants_declared_under_parse_lock() {
        let program = Program::new();
        program.with_root(|ns| ns.declare_constant("PI", lit_int(3)).unwrap());
        let mut evaluator = EchoEvaluator;
        program.commit(&mut evaluator).unwrap();
        let value = program.with_root(|ns| ns.committed_constant("PI"));
        assert_eq!(value, Some(Value::Int(3)));
    }

    #[test]
    fn thread_data_round_trips_per_slot() {
        let program = Program::new();
        program.allocate_thread_slot(7);
        program.save_thread_data(7, "k", Value::Int(1));
        assert_eq!(program.get_thread_data(7, "k"), Some(Value::Int(1)));
        assert_eq!(program.get_thread_data(8, "k"), None);
        program.free_thread_slot(7);
        assert_eq!(program.get_thread_data(7, "k"), None);
    }
}
