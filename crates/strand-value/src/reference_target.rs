//! The reference capability behind `Value::Reference` (§4.3/C3).
//!
//! A `Reference` captures a parse-time lvalue expression together with the
//! object/program context needed to re-resolve it later, possibly from a
//! different thread (§3 invariant 4). The concrete lvalue-path walking
//! logic lives in `strand-lvalue`, which implements this trait; this crate
//! only needs the capability shape so `Value::Reference` can hold it.

use std::fmt;

use crate::exception_core::ExceptionCore;
use crate::value::Value;

pub trait ReferenceTarget: Send + Sync + fmt::Debug {
    /// Read the current value of the referenced cell without taking it.
    fn get(&self) -> Result<Value, ExceptionCore>;

    /// Atomically replace the referenced cell's value, returning the old
    /// value (used when a hidden local is copied back into the caller's
    /// cell on return from a by-reference call, §4.3).
    fn assign(&self, new_value: Value) -> Result<Value, ExceptionCore>;

    /// Identity used to order lock acquisition across multiple references
    /// that might alias the same cell (§4.3: "deterministic order ...
    /// object pointer ascending").
    fn lock_order_key(&self) -> usize;
}
