//! Runtime value model for the Strand language core.
//!
//! This crate owns the tagged value representation ([`Value`]) that every
//! other crate in the workspace passes around, plus the container types
//! (`Hash`, `List`, the blocking `Queue`) and the small set of capability
//! traits ([`Callable`], [`ReferenceTarget`], [`ProgramContext`]) that let
//! higher crates (the resolver, the evaluator, the lvalue helper) plug
//! concrete behavior into a `Value` variant without this crate depending on
//! them back.
//!
//! Polymorphism across variants (evaluate, coerce, compare) is expressed as
//! a capability set implemented per variant rather than as a class
//! hierarchy: see `callable.rs` and `reference_target.rs`.

pub mod callable;
pub mod coercion;
pub mod date;
pub mod encoding;
pub mod equality;
pub mod exception_core;
pub mod hash;
pub mod list;
pub mod number;
pub mod object;
pub mod pattern;
pub mod queue;
pub mod reference_target;
pub mod string;
pub mod value;

pub use callable::{Callable, ProgramContext};
pub use date::QDate;
pub use encoding::Encoding;
pub use exception_core::{ExceptionCore, ExceptionKind};
pub use hash::QHash;
pub use list::QList;
pub use number::QNumber;
pub use object::{ObjectLockGuard, ObjectStatus, QObject};
pub use queue::{BlockingQueue, QueueError};
pub use reference_target::ReferenceTarget;
pub use string::QString;
pub use value::Value;
