//! Built-in demo programs for the CLI, hand-built via `strand_ast::builder`
//! since there is no front end to parse source text (§4.12).

use strand_ast::builder::*;
use strand_ast::{BinaryOp, LValuePath, Stmt};
use strand_value::Value;

/// Global variable the "hello" demo's result is stored in, for the caller
/// to read back and print once evaluation finishes.
pub const RESULT_GLOBAL: &str = "result";

/// Looks up a demo body by name, or `None` if `name` is not recognized.
pub fn build(name: &str) -> Option<Vec<Stmt>> {
    match name {
        "hello" => Some(hello()),
        "boom" => Some(boom()),
        _ => None,
    }
}

/// Concatenates a string and an int via mixed-type `+` and stores the
/// result in the global `result`, which the caller prints on success.
fn hello() -> Vec<Stmt> {
    vec![expr_stmt(assign(
        LValuePath::Global(RESULT_GLOBAL.to_string()),
        bin(BinaryOp::Add, lit_str("Strand says hello, attempt #"), lit_int(1)),
    ))]
}

/// Throws an uncaught exception so the top-level handler's printing path
/// (§7) has something to exercise.
fn boom() -> Vec<Stmt> {
    vec![throw_stmt(
        lit_str("DemoError"),
        lit_str("this demo always throws"),
        Some(lit(Value::list(vec![Value::Int(1), Value::Int(2)]))),
    )]
}
