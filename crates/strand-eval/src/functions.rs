//! The `Call{callee, args}` dispatch table (§4.5, §6): a flat
//! name-to-`Callable` registry the evaluator consults for every call
//! expression. User-declared functions/methods and native builtins are both
//! just `Arc<dyn Callable>` entries here — the evaluator doesn't care which.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strand_value::{Callable, ExceptionCore, ProgramContext, Value};

#[derive(Default)]
pub struct FunctionTable {
    functions: HashMap<String, Arc<dyn Callable>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    pub fn register(&mut self, callable: Arc<dyn Callable>) {
        self.functions.insert(callable.name().to_string(), callable);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Callable>> {
        self.functions.get(name).cloned()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

/// A `Callable` backed by a plain Rust closure, for native builtins and
/// test fixtures that don't need a full user-defined-function record.
pub struct NativeFn {
    name: String,
    program: Arc<dyn ProgramContext>,
    func: Box<dyn Fn(Vec<Value>) -> Result<Value, ExceptionCore> + Send + Sync>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).finish()
    }
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        program: Arc<dyn ProgramContext>,
        func: impl Fn(Vec<Value>) -> Result<Value, ExceptionCore> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(NativeFn { name: name.into(), program, func: Box::new(func) })
    }
}

impl Callable for NativeFn {
    fn invoke(&self, args: Vec<Value>) -> Result<Value, ExceptionCore> {
        (self.func)(args)
    }

    fn program_context(&self) -> Arc<dyn ProgramContext> {
        self.program.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
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
    fn register_then_invoke_a_native_fn() {
        let mut table = FunctionTable::new();
        let program: Arc<dyn ProgramContext> = Arc::new(TestProgram);
        let double = NativeFn::new("double", program, |args| {
            Ok(Value::Int(args.first().map(|v| v.as_int()).unwrap_or(0) * 2))
        });
        table.register(double);
        let found = table.lookup("double").expect("registered");
        assert_eq!(found.invoke(vec![Value::Int(21)]).unwrap(), Value::Int(42));
    }

    #[test]
    fn missing_function_is_not_declared() {
        let table = FunctionTable::new();
        assert!(!table.is_declared("nope"));
        assert!(table.lookup("nope").is_none());
    }
}
