//! `LValueHelper`: locate, lock, read, assign (§4.3).

use std::fmt;
use std::sync::Arc;

use strand_ast::CompoundOp;
use strand_value::Value;

use crate::context::LValueContext;
use crate::located::{Located, RootHandle};
use crate::path::{ResolvedPath, ResolvedRoot};

#[derive(Debug, Clone, PartialEq)]
pub enum LValueError {
    UnresolvedVariable(String),
    NoCurrentSelf,
    ObjectDeleted,
    TypeMismatch { expected: &'static str, found: &'static str },
    Deadlock,
}

impl fmt::Display for LValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LValueError::UnresolvedVariable(name) => write!(f, "UNRESOLVED-VARIABLE: '{}' is not declared", name),
            LValueError::NoCurrentSelf => write!(f, "MEMBER-ACCESS-ERROR: no current object ('self') in scope"),
            LValueError::ObjectDeleted => write!(f, "OBJECT-ALREADY-DELETED: the object has already been deleted"),
            LValueError::TypeMismatch { expected, found } => {
                write!(f, "TYPE-MISMATCH: expected {}, found {}", expected, found)
            }
            LValueError::Deadlock => write!(f, "OBJECT-LOCK-DEADLOCK: lock ordering would deadlock"),
        }
    }
}
impl std::error::Error for LValueError {}

impl From<strand_value::ObjectDeletedError> for LValueError {
    fn from(_: strand_value::ObjectDeletedError) -> Self {
        LValueError::ObjectDeleted
    }
}

impl From<LValueError> for strand_value::ExceptionCore {
    fn from(e: LValueError) -> Self {
        let err = match e {
            LValueError::UnresolvedVariable(_) => "UNRESOLVED-VARIABLE",
            LValueError::NoCurrentSelf => "MEMBER-ACCESS-ERROR",
            LValueError::ObjectDeleted => "OBJECT-ALREADY-DELETED",
            LValueError::TypeMismatch { .. } => "TYPE-MISMATCH",
            LValueError::Deadlock => "OBJECT-LOCK-DEADLOCK",
        };
        strand_value::ExceptionCore::system(err, e.to_string())
    }
}

/// A located, ready-to-use lvalue. Holds no lock for its own lifetime (every
/// operation re-enters the root's lock for the duration of that one
/// operation); the root object's lock is reentrant per thread (§4.3 rule
/// 4), so nested `LValueHelper` operations on the same object from the same
/// thread — e.g. a compound assignment whose RHS also reads a sibling
/// member — never self-deadlock.
pub struct LValueHelper {
    located: Located,
}

impl LValueHelper {
    pub fn locate(ctx: &dyn LValueContext, path: &ResolvedPath) -> Result<Self, LValueError> {
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
        Ok(LValueHelper { located: Located { root, steps: path.steps.clone() } })
    }

    fn with_target_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Result<R, LValueError> {
        self.located.with_mut(f)
    }

    pub fn current_value(&self) -> Result<Value, LValueError> {
        self.with_target_mut(|v| v.clone())
    }

    pub fn assign(&self, new_value: Value) -> Result<(), LValueError> {
        self.with_target_mut(|v| *v = new_value)
    }

    /// Remove and return the current value, leaving `Nothing` behind
    /// (`extract`'s single-slot special case, and the basis for `takeValue`
    /// style builtins, §4.5).
    pub fn take_value(&self) -> Result<Value, LValueError> {
        self.with_target_mut(|v| std::mem::replace(v, Value::Nothing))
    }

    /// Force copy-on-write on a `List`/`Hash` target ahead of a caller that
    /// will mutate the container directly (e.g. `splice`/`extract`), so two
    /// lvalues that happen to share the same `Arc` never observe each
    /// other's in-place edit.
    pub fn ensure_unique(&self) -> Result<(), LValueError> {
        self.with_target_mut(|v| match v {
            Value::List(l) => {
                Arc::make_mut(l);
            }
            Value::Hash(h) => {
                Arc::make_mut(h);
            }
            _ => {}
        })
    }

    /// `+=` fast path for values known at parse time to be `Int` (§4.5).
    pub fn plus_equals_bigint(&self, delta: i64) -> Result<(), LValueError> {
        self.with_target_mut(|v| {
            if let Value::Int(i) = v {
                *i += delta;
            } else {
                *v = Value::Int(v.as_int() + delta);
            }
        })
    }

    /// `-=` fast path for values known at parse time to be `Float` (§4.5).
    pub fn minus_equals_float(&self, delta: f64) -> Result<(), LValueError> {
        self.with_target_mut(|v| {
            if let Value::Float(f) = v {
                *f -= delta;
            } else {
                *v = Value::Float(v.as_float() - delta);
            }
        })
    }

    /// The general, type-driven compound-assignment table (§4.5): the
    /// behavior of `op=` depends on the current value's type, not just the
    /// operator.
    pub fn apply_compound(&self, op: CompoundOp, rhs: Value) -> Result<(), LValueError> {
        self.with_target_mut(|v| apply_compound_in_place(v, op, rhs))
    }
}

/// `lv op= rhs`, current-type-driven (§4.5): list append, hash merge,
/// string/binary concatenation, date arithmetic, or numeric arithmetic for
/// `+=`; key/member removal or subtraction for `-=`; plain numeric
/// arithmetic for the rest.
fn apply_compound_in_place(v: &mut Value, op: CompoundOp, rhs: Value) {
    match (op, &mut *v) {
        (CompoundOp::Add, Value::List(l)) => {
            Arc::make_mut(l).push(rhs);
        }
        (CompoundOp::Add, Value::Hash(h)) => {
            if let Value::Hash(rh) = &rhs {
                Arc::make_mut(h).merge(rh, strand_value::hash::DuplicatePolicy::Overwrite);
            }
        }
        (CompoundOp::Add, Value::String(_)) => {
            let combined = format!("{}{}", v.as_string().as_str(), rhs.as_string().as_str());
            *v = Value::string(combined);
        }
        (CompoundOp::Add, Value::Binary(b)) => {
            if let Value::Binary(rb) = &rhs {
                Arc::make_mut(b).extend_from_slice(rb);
            }
        }
        (CompoundOp::Add, Value::Date(d)) => {
            let rhs_date = rhs.as_date();
            if let Ok(sum) = d.add(&rhs_date) {
                *v = Value::Date(Arc::new(sum));
            } else {
                // Non-date/non-numeric RHS onto a Date coerces through
                // seconds (§9 design-note decision b).
                let seconds = rhs.as_int();
                let delta = strand_value::QDate::Relative(strand_value::date::RelativeDate {
                    seconds: seconds as i32,
                    ..Default::default()
                });
                if let Ok(sum) = d.add(&delta) {
                    *v = Value::Date(Arc::new(sum));
                }
            }
        }
        (CompoundOp::Sub, Value::Hash(h)) => {
            match &rhs {
                Value::String(s) => {
                    Arc::make_mut(h).delete(&s.as_str());
                }
                Value::List(keys) => {
                    let hm = Arc::make_mut(h);
                    for k in keys.iter() {
                        hm.delete(&k.as_string().as_str());
                    }
                }
                _ => {}
            }
        }
        (CompoundOp::Sub, Value::Date(d)) => {
            let rhs_date = rhs.as_date();
            if let Ok(diff) = d.sub(&rhs_date) {
                *v = Value::Date(Arc::new(diff));
            }
        }
        (CompoundOp::Sub, Value::Object(obj)) => {
            match &rhs {
                Value::String(s) => {
                    let _ = obj.delete_member(&s.as_str());
                }
                Value::List(keys) => {
                    for k in keys.iter() {
                        let _ = obj.delete_member(&k.as_string().as_str());
                    }
                }
                _ => {}
            }
        }
        (op, _) => apply_numeric_compound(v, op, &rhs),
    }
}

fn apply_numeric_compound(v: &mut Value, op: CompoundOp, rhs: &Value) {
    let uses_float = matches!(v, Value::Float(_)) || matches!(rhs, Value::Float(_));
    let uses_number = matches!(v, Value::Number(_)) || matches!(rhs, Value::Number(_));
    if uses_number {
        let a = v.as_number();
        let b = rhs.as_number();
        *v = Value::Number(match op {
            CompoundOp::Add => a.add(&b),
            CompoundOp::Sub => a.sub(&b),
            CompoundOp::Mul => a.mul(&b),
            // Division by zero leaves the value unchanged; the evaluator's
            // own `/=` path is expected to check and raise
            // `DIVISION-BY-ZERO` before ever reaching this fast path.
            CompoundOp::Div => a.div(&b).unwrap_or(a),
            _ => a,
        });
    } else if uses_float {
        let a = v.as_float();
        let b = rhs.as_float();
        *v = Value::Float(match op {
            CompoundOp::Add => a + b,
            CompoundOp::Sub => a - b,
            CompoundOp::Mul => a * b,
            CompoundOp::Div => a / b,
            _ => a,
        });
    } else {
        let a = v.as_int();
        let b = rhs.as_int();
        *v = Value::Int(match op {
            CompoundOp::Add => a + b,
            CompoundOp::Sub => a - b,
            CompoundOp::Mul => a * b,
            CompoundOp::Div if b != 0 => a / b,
            CompoundOp::Div => 0,
            CompoundOp::Mod if b != 0 => a % b,
            CompoundOp::Mod => 0,
            CompoundOp::BitAnd => a & b,
            CompoundOp::BitOr => a | b,
            CompoundOp::BitXor => a ^ b,
            CompoundOp::Shl => a << (b & 63),
            CompoundOp::Shr => a >> (b & 63),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ResolvedStep;
    use crate::scope::{Cell, ScopeStack};
    use strand_value::QObject;

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
    fn assign_and_read_local() {
        let mut scope = ScopeStack::new();
        scope.declare("x", Value::Int(1));
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("x".to_string()));
        let helper = LValueHelper::locate(&ctx, &path).unwrap();
        assert_eq!(helper.current_value().unwrap(), Value::Int(1));
        helper.assign(Value::Int(42)).unwrap();
        assert_eq!(helper.current_value().unwrap(), Value::Int(42));
    }

    #[test]
    fn plus_equals_bigint_fast_path() {
        let mut scope = ScopeStack::new();
        scope.declare("n", Value::Int(10));
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("n".to_string()));
        let helper = LValueHelper::locate(&ctx, &path).unwrap();
        helper.plus_equals_bigint(5).unwrap();
        assert_eq!(helper.current_value().unwrap(), Value::Int(15));
    }

    #[test]
    fn nested_hash_key_path_creates_intermediate_hash() {
        let mut scope = ScopeStack::new();
        scope.declare("h", Value::Nothing);
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("h".to_string()))
            .with_step(ResolvedStep::HashKey("a".to_string()));
        let helper = LValueHelper::locate(&ctx, &path).unwrap();
        helper.assign(Value::Int(7)).unwrap();
        let root_path = ResolvedPath::root(ResolvedRoot::Local("h".to_string()));
        let root_helper = LValueHelper::locate(&ctx, &root_path).unwrap();
        if let Value::Hash(h) = root_helper.current_value().unwrap() {
            assert_eq!(h.get("a"), Some(&Value::Int(7)));
        } else {
            panic!("expected hash");
        }
    }

    #[test]
    fn compound_add_appends_to_list() {
        let mut scope = ScopeStack::new();
        scope.declare("l", Value::list(vec![Value::Int(1)]));
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("l".to_string()));
        let helper = LValueHelper::locate(&ctx, &path).unwrap();
        helper.apply_compound(CompoundOp::Add, Value::Int(2)).unwrap();
        assert_eq!(helper.current_value().unwrap(), Value::list(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn unresolved_variable_errors() {
        let ctx = TestCtx { scope: ScopeStack::new() };
        let path = ResolvedPath::root(ResolvedRoot::Local("missing".to_string()));
        assert!(matches!(LValueHelper::locate(&ctx, &path), Err(LValueError::UnresolvedVariable(_))));
    }

    #[derive(Debug)]
    struct TestProgram;
    impl strand_value::ProgramContext for TestProgram {
        fn program_id(&self) -> u64 {
            1
        }
    }

    #[test]
    fn compound_sub_removes_object_member_instead_of_coercing_to_int() {
        let program: Arc<dyn strand_value::ProgramContext> = Arc::new(TestProgram);
        let obj = QObject::new(1, program, None);
        obj.set_member("a", Value::Int(1)).unwrap();
        obj.set_member("b", Value::Int(2)).unwrap();

        let mut scope = ScopeStack::new();
        scope.declare("o", Value::Object(obj.clone()));
        let ctx = TestCtx { scope };
        let path = ResolvedPath::root(ResolvedRoot::Local("o".to_string()));
        let helper = LValueHelper::locate(&ctx, &path).unwrap();

        helper.apply_compound(CompoundOp::Sub, Value::string("a")).unwrap();

        // The lvalue must still hold the same object, not an Int coerced
        // from `Object::as_int`'s 0 fallback.
        assert!(matches!(helper.current_value().unwrap(), Value::Object(_)));
        assert_eq!(obj.get_member("a").unwrap(), Value::Nothing);
        assert_eq!(obj.get_member("b").unwrap(), Value::Int(2));
    }
}
