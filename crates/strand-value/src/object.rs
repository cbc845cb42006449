//! `Object`: the thread-safe record behind `Value::Object` (§3, §4.1, §5).
//!
//! Two reference counts are kept on the shared cell, mirroring the source's
//! split between "scope" references (the ones a program sees) and "tether"
//! references (internal ones that must not re-trigger the destructor):
//! when the scope count reaches zero the destructor runs exactly once,
//! while the Rust `Arc` strong count (tether-equivalent) can still be
//! higher and keeps the allocation alive until it too drops.
//!
//! Member access is guarded by a recursive (reentrant) lock so that a
//! method can call another method on `self` from the same thread without
//! deadlocking, while a different thread attempting the same access blocks
//! (§5 shared-resource policy).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::callable::ProgramContext;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectStatus {
    Active = 0,
    BeingDeleted = 1,
    Deleted = 2,
}

impl ObjectStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ObjectStatus::Active,
            1 => ObjectStatus::BeingDeleted,
            _ => ObjectStatus::Deleted,
        }
    }
}

/// Error raised by any member access on a deleted object (§3 invariant 3,
/// §7: `OBJECT-ALREADY-DELETED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDeletedError;

impl fmt::Display for ObjectDeletedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OBJECT-ALREADY-DELETED: the object has already been deleted")
    }
}
impl std::error::Error for ObjectDeletedError {}

struct Fields {
    members: HashMap<String, Value>,
    private_data: HashMap<u64, Arc<dyn Any + Send + Sync>>,
}

/// A callback run exactly once when the scope count reaches zero while the
/// object is still live — the class's destructor method, invoked by
/// whichever evaluator crate constructs the object (§4.1 "Acquire/release").
pub type Destructor = Box<dyn FnOnce(&QObject) + Send + Sync>;

pub struct QObject {
    pub class_id: u64,
    scope_count: AtomicUsize,
    tether_count: AtomicUsize,
    status: AtomicU8,
    fields: ReentrantMutex<RefCell<Fields>>,
    owning_program: Arc<dyn ProgramContext>,
    destructor: parking_lot::Mutex<Option<Destructor>>,
}

impl fmt::Debug for QObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QObject")
            .field("class_id", &self.class_id)
            .field("status", &self.status())
            .finish()
    }
}

impl QObject {
    pub fn new(class_id: u64, owning_program: Arc<dyn ProgramContext>, destructor: Option<Destructor>) -> Arc<Self> {
        Arc::new(QObject {
            class_id,
            scope_count: AtomicUsize::new(1),
            tether_count: AtomicUsize::new(1),
            status: AtomicU8::new(ObjectStatus::Active as u8),
            fields: ReentrantMutex::new(RefCell::new(Fields {
                members: HashMap::new(),
                private_data: HashMap::new(),
            })),
            owning_program,
            destructor: parking_lot::Mutex::new(destructor),
        })
    }

    pub fn status(&self) -> ObjectStatus {
        ObjectStatus::from_u8(self.status.load(AtomicOrdering::Acquire))
    }

    pub fn owning_program(&self) -> &Arc<dyn ProgramContext> {
        &self.owning_program
    }

    /// Increments the scope count (an "acquire" on the scope handle).
    pub fn scope_acquire(&self) {
        self.scope_count.fetch_add(1, AtomicOrdering::AcqRel);
    }

    /// Increments the tether count; used internally to keep the shell
    /// alive beyond the scope handle's lifetime (§9 design notes).
    pub fn tether_acquire(&self) {
        self.tether_count.fetch_add(1, AtomicOrdering::AcqRel);
    }

    pub fn tether_release(&self) {
        self.tether_count.fetch_sub(1, AtomicOrdering::AcqRel);
    }

    /// Decrements the scope count; if it reaches zero and the object is
    /// still live, runs the destructor exactly once under the object's own
    /// lock, transitions `Active -> BeingDeleted -> Deleted`, releases
    /// fields outside the lock, then drops the tether count (§4.1).
    pub fn scope_release(self: &Arc<Self>) {
        let prev = self.scope_count.fetch_sub(1, AtomicOrdering::AcqRel);
        if prev != 1 {
            return;
        }
        if self
            .status
            .compare_exchange(
                ObjectStatus::Active as u8,
                ObjectStatus::BeingDeleted as u8,
                AtomicOrdering::AcqRel,
                AtomicOrdering::Acquire,
            )
            .is_err()
        {
            return;
        }
        let destructor = self.destructor.lock().take();
        if let Some(d) = destructor {
            let guard = self.fields.lock();
            drop(guard); // destructor re-enters via public methods, which re-lock.
            d(self);
        }
        let mut drained = HashMap::new();
        {
            let guard = self.fields.lock();
            let mut fields = guard.borrow_mut();
            std::mem::swap(&mut drained, &mut fields.members);
            fields.private_data.clear();
        }
        drop(drained);
        self.status.store(ObjectStatus::Deleted as u8, AtomicOrdering::Release);
        self.tether_release();
    }

    fn check_live(&self) -> Result<(), ObjectDeletedError> {
        if self.status() == ObjectStatus::Deleted {
            Err(ObjectDeletedError)
        } else {
            Ok(())
        }
    }

    pub fn get_member(&self, name: &str) -> Result<Value, ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        Ok(guard.borrow().members.get(name).cloned().unwrap_or(Value::Nothing))
    }

    pub fn set_member(&self, name: &str, value: Value) -> Result<(), ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        guard.borrow_mut().members.insert(name.to_string(), value);
        Ok(())
    }

    /// Atomic read-modify-write on a single member, under one lock
    /// acquisition — the primitive the lvalue helper's compound-assignment
    /// fast paths need (a plain `get_member` + `set_member` pair would let
    /// another thread observe or clobber the value in between).
    pub fn with_member_mut<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> Result<R, ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        let mut fields = guard.borrow_mut();
        let entry = fields.members.entry(name.to_string()).or_insert(Value::Nothing);
        Ok(f(entry))
    }

    /// Acquire the object's lock for the duration of the returned guard,
    /// without exposing its private field storage. Used by the lvalue
    /// helper to hold locks across several objects in a deterministic,
    /// object-pointer-ascending order while a multi-object lvalue
    /// expression is located (§4.3).
    pub fn lock(&self) -> ObjectLockGuard<'_> {
        ObjectLockGuard { _guard: self.fields.lock() }
    }

    pub fn member_names(&self) -> Result<Vec<String>, ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        Ok(guard.borrow().members.keys().cloned().collect())
    }

    /// Removes a single member, if present. Used by `-=` on an object
    /// (§4.5: "on object -> remove members similarly" to a hash).
    pub fn delete_member(&self, name: &str) -> Result<(), ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        guard.borrow_mut().members.remove(name);
        Ok(())
    }

    pub fn set_private_data(&self, key: u64, data: Arc<dyn Any + Send + Sync>) -> Result<(), ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        guard.borrow_mut().private_data.insert(key, data);
        Ok(())
    }

    pub fn private_data(&self, key: u64) -> Result<Option<Arc<dyn Any + Send + Sync>>, ObjectDeletedError> {
        self.check_live()?;
        let guard = self.fields.lock();
        Ok(guard.borrow().private_data.get(&key).cloned())
    }

    /// Re-entrant scoped lock around a closure, for lvalue helper access
    /// that must hold the object's lock for the duration of a method or
    /// lvalue scope (§5 shared-resource policy). The same thread may call
    /// this again from within `f` without deadlocking.
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.fields.lock();
        f()
    }
}

/// Opaque handle on `QObject`'s internal lock; holding one excludes other
/// threads from member access (and from running the destructor) without
/// exposing `Fields` outside this module.
pub struct ObjectLockGuard<'a> {
    _guard: parking_lot::ReentrantMutexGuard<'a, RefCell<Fields>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestProgram;
    impl ProgramContext for TestProgram {
        fn program_id(&self) -> u64 {
            1
        }
    }

    #[test]
    fn destructor_runs_exactly_once_at_zero_scope() {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let obj = QObject::new(
            1,
            program,
            Some(Box::new(move |_o| {
                count2.fetch_add(1, AtomicOrdering::SeqCst);
            })),
        );
        obj.scope_acquire();
        obj.scope_release();
        assert_eq!(obj.status(), ObjectStatus::Active);
        obj.scope_release();
        assert_eq!(obj.status(), ObjectStatus::Deleted);
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn deleted_object_rejects_member_access() {
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let obj = QObject::new(1, program, None);
        obj.scope_release();
        assert!(obj.get_member("x").is_err());
    }

    #[test]
    fn with_member_mut_is_atomic_read_modify_write() {
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let obj = QObject::new(1, program, None);
        obj.set_member("count", Value::Int(1)).unwrap();
        obj.with_member_mut("count", |v| *v = Value::Int(v.as_int() + 1)).unwrap();
        assert_eq!(obj.get_member("count").unwrap(), Value::Int(2));
    }

    #[test]
    fn reentrant_lock_allows_same_thread_reentry() {
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let obj = QObject::new(1, program, None);
        obj.with_lock(|| {
            obj.with_lock(|| {
                obj.set_member("x", Value::Int(1)).unwrap();
            });
        });
        assert_eq!(obj.get_member("x").unwrap(), Value::Int(1));
    }
}
