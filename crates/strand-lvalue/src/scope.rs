//! Block-scoped local variables (§4.9 thread-data: "local-variable stack").
//!
//! A `Cell` is the shared, lockable storage behind one variable binding.
//! `ScopeStack` is a stack of `{name -> Cell}` maps, innermost block last;
//! lookup walks from the top down so inner bindings shadow outer ones.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use strand_value::Value;

pub type Cell = Arc<Mutex<Value>>;

pub fn new_cell(initial: Value) -> Cell {
    Arc::new(Mutex::new(initial))
}

pub type Scope = HashMap<String, Cell>;

#[derive(Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: vec![Scope::new()] }
    }

    pub fn push_block(&mut self) {
        self.frames.push(Scope::new());
    }

    pub fn pop_block(&mut self) {
        self.frames.pop();
        if self.frames.is_empty() {
            self.frames.push(Scope::new());
        }
    }

    pub fn declare(&mut self, name: impl Into<String>, initial: Value) -> Cell {
        let cell = new_cell(initial);
        self.frames.last_mut().expect("scope stack never empty").insert(name.into(), cell.clone());
        cell
    }

    pub fn lookup(&self, name: &str) -> Option<Cell> {
        self.frames.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_block_shadows_outer() {
        let mut stack = ScopeStack::new();
        stack.declare("x", Value::Int(1));
        stack.push_block();
        stack.declare("x", Value::Int(2));
        assert_eq!(*stack.lookup("x").unwrap().lock(), Value::Int(2));
        stack.pop_block();
        assert_eq!(*stack.lookup("x").unwrap().lock(), Value::Int(1));
    }

    #[test]
    fn lookup_missing_is_none() {
        let stack = ScopeStack::new();
        assert!(stack.lookup("missing").is_none());
    }
}
