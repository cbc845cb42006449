//! The resolved, owned storage handle shared by [`crate::LValueHelper`] and
//! [`crate::Reference`]: a root cell/member plus nested steps, with the
//! single `with_mut` entry point that actually walks and locks it.

use std::sync::Arc;

use strand_value::{QHash, QObject, Value};

use crate::helper::LValueError;
use crate::path::ResolvedStep;
use crate::scope::Cell;

pub(crate) enum RootHandle {
    Cell(Cell),
    Member { object: Arc<QObject>, name: String },
}

pub(crate) struct Located {
    pub(crate) root: RootHandle,
    pub(crate) steps: Vec<ResolvedStep>,
}

impl Located {
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Result<R, LValueError> {
        match &self.root {
            RootHandle::Cell(cell) => {
                let mut guard = cell.lock();
                let target = navigate_mut(&mut guard, &self.steps)?;
                Ok(f(target))
            }
            RootHandle::Member { object, name } => {
                object.with_member_mut(name, |member| match navigate_mut(member, &self.steps) {
                    Ok(target) => Ok(f(target)),
                    Err(e) => Err(e),
                })?
            }
        }
    }

    /// Identity used to order lock acquisition across aliasing references
    /// (§4.3): the root cell's or object's allocation address.
    pub(crate) fn lock_order_key(&self) -> usize {
        match &self.root {
            RootHandle::Cell(cell) => Arc::as_ptr(cell) as usize,
            RootHandle::Member { object, .. } => Arc::as_ptr(object) as usize,
        }
    }
}

pub(crate) fn navigate_mut<'a>(
    mut current: &'a mut Value,
    steps: &[ResolvedStep],
) -> Result<&'a mut Value, LValueError> {
    for step in steps {
        current = match step {
            ResolvedStep::HashKey(key) => {
                if matches!(current, Value::Nothing) {
                    *current = Value::hash(QHash::new());
                }
                match current {
                    Value::Hash(h) => Arc::make_mut(h).get_or_insert_mut(key),
                    other => {
                        return Err(LValueError::TypeMismatch { expected: "hash", found: other.type_name() })
                    }
                }
            }
            ResolvedStep::ListIndex(index) => {
                if matches!(current, Value::Nothing) {
                    *current = Value::list(Vec::new());
                }
                match current {
                    Value::List(l) => Arc::make_mut(l).get_or_insert_mut(*index),
                    other => {
                        return Err(LValueError::TypeMismatch { expected: "list", found: other.type_name() })
                    }
                }
            }
        };
    }
    Ok(current)
}
