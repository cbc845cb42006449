//! The lookup surface `LValueHelper::locate` needs from the caller's
//! execution frame (§4.3).

use std::sync::Arc;

use strand_value::QObject;

use crate::scope::Cell;

pub trait LValueContext {
    fn local(&self, name: &str) -> Option<Cell>;
    fn closure(&self, name: &str) -> Option<Cell>;
    /// Globals are process/program-wide, so lookups never fail to find the
    /// slot once declared — callers that need "declare on first write"
    /// semantics should pre-declare via whatever owns the global table
    /// (`strand-resolver`'s `Program`).
    fn global(&self, name: &str) -> Option<Cell>;
    fn current_self(&self) -> Option<Arc<QObject>>;
}
