//! Per-thread state table, resource tracking, and the OS-signal bridge
//! (§4.9 Thread model / §4.10 Signal bridge, C9+C10).
//!
//! The blocking queue used for cross-thread hand-off lives in
//! `strand_value::queue` (§4.2.3/C2) rather than here — it's a container
//! primitive, not thread-table bookkeeping, and `strand-log`'s appender
//! pump threads need it without depending on this crate.

pub mod resource;
pub mod signal;
pub mod table;

pub use resource::{Releasable, ResourceTracker};
pub use signal::{SignalBridge, SignalError};
pub use table::{SlotStatus, ThreadError, ThreadTable, DEFAULT_CAPACITY, SIGNAL_THREAD_SLOT};
