//! End-to-end scenarios (§8): literal inputs run through the resolver and
//! evaluator, checked against their exact expected outputs.

use std::sync::Arc;
use std::time::Duration;

use strand_ast::builder::*;
use strand_ast::{BinaryOp, LValuePath};
use strand_eval::Evaluator;
use strand_resolver::class::Class;
use strand_resolver::Program;
use strand_value::pattern::RegexOptions;
use strand_value::{ObjectStatus, QHash, QObject, Value};

fn new_evaluator() -> Evaluator {
    Evaluator::new(Program::new())
}

fn global_path(name: &str) -> LValuePath {
    LValuePath::Global(name.to_string())
}

/// Globals must be declared on the `Program` before any lvalue path can
/// resolve them (`Program::global` only finds already-declared cells).
fn declare_global(eval: &Evaluator, name: &str) {
    eval.program().declare_global(name, Value::Nothing);
}

/// 1. Hash order preservation: set a←1; set b←2; set a←3 ⇒ iterate [(a,3),(b,2)], size 2.
#[test]
fn hash_order_preservation() {
    let mut eval = new_evaluator();
    declare_global(&eval, "h");
    eval.eval_expr(&assign(global_path("h"), lit(Value::hash(QHash::new())))).unwrap();
    for (k, v) in [("a", 1), ("b", 2), ("a", 3)] {
        eval.eval_expr(&assign(hash_key_path(global_path("h"), lit_str(k)), lit_int(v))).unwrap();
    }
    let h = eval.eval_expr(&global("h")).unwrap();
    let Value::Hash(h) = h else { panic!("expected a hash") };
    let entries: Vec<(&str, i64)> = h.iter().map(|(k, v)| (k.as_str(), v.as_int())).collect();
    assert_eq!(entries, vec![("a", 3), ("b", 2)]);
    assert_eq!(h.len(), 2);
}

/// 2. Splice extraction: l = [10,20,30,40,50]; extract l,1,2 ⇒ [20,30], l = [10,40,50].
#[test]
fn splice_extraction() {
    let mut eval = new_evaluator();
    declare_global(&eval, "l");
    let initial = Value::list(vec![10, 20, 30, 40, 50].into_iter().map(Value::Int).collect());
    eval.eval_expr(&assign(global_path("l"), lit(initial))).unwrap();

    let removed = eval.eval_expr(&extract_expr(global_path("l"), lit_int(1), Some(lit_int(2)), None)).unwrap();
    let Value::List(removed) = removed else { panic!("expected a list") };
    assert_eq!(removed.iter().map(Value::as_int).collect::<Vec<_>>(), vec![20, 30]);

    let remaining = eval.eval_expr(&global("l")).unwrap();
    let Value::List(remaining) = remaining else { panic!("expected a list") };
    assert_eq!(remaining.iter().map(Value::as_int).collect::<Vec<_>>(), vec![10, 40, 50]);
}

/// 3. Regex global substitute: /a(b+)/g over "abbabbb" with template "<$1>" ⇒ "<bb><bbb>".
#[test]
fn regex_global_substitute() {
    let mut eval = new_evaluator();
    declare_global(&eval, "s");
    eval.eval_expr(&assign(global_path("s"), lit_str("abbabbb"))).unwrap();

    let options = RegexOptions { global: true, ..RegexOptions::default() };
    let subst = strand_regex::cache::global().compile_subst("a(b+)", options, "<$1>").unwrap();
    let result = eval.eval_expr(&regex_substitute(global_path("s"), Value::RegexSubst(subst), "<$1>")).unwrap();
    assert_eq!(result, Value::string("<bb><bbb>"));
    assert_eq!(eval.eval_expr(&global("s")).unwrap(), Value::string("<bb><bbb>"));
}

/// 4. Foldl with mixed types: foldl $1 + $2, [1, 2.5, "x"] ⇒ "3.5x".
#[test]
fn foldl_with_mixed_types() {
    let mut eval = new_evaluator();
    let source = lit(Value::list(vec![Value::Int(1), Value::Float(2.5), Value::string("x")]));
    let body = bin(BinaryOp::Add, implicit_element_n(1), implicit_element_n(2));
    let result = eval.eval_expr(&foldl_op(source, body)).unwrap();
    assert_eq!(result, Value::string("3.5x"));
}

/// 5. Object delete-while-in-use: thread A holds the member lock; thread B's
/// delete blocks until A releases, then the object transitions to Deleted and
/// subsequent member access sees `ObjectDeletedError`.
#[test]
fn object_delete_while_in_use() {
    let program = Program::new();
    let object = QObject::new(1, program.clone(), None);
    object.set_member("x", Value::Int(1)).unwrap();

    let guard = object.lock();
    let deleter = object.clone();
    let handle = std::thread::spawn(move || deleter.scope_release());

    // The deleter thread must block on the held lock, not race ahead.
    std::thread::sleep(Duration::from_millis(50));
    assert!(!handle.is_finished());
    assert_eq!(object.status(), ObjectStatus::Active);

    drop(guard);
    handle.join().unwrap();

    assert_eq!(object.status(), ObjectStatus::Deleted);
    assert!(object.get_member("x").is_err());
}

/// 6. Parse rollback: declaring a duplicate class inside a namespace errors
/// on the second declaration; commit is skipped, leaving committed state
/// exactly as it was before the parse began.
#[test]
fn parse_rollback_on_duplicate_class() {
    let program = Program::new();

    let had_error = program.with_root(|root| {
        let ns = root.declare_namespace("X");
        ns.declare_class("C", Arc::new(Class::new("C"))).unwrap();
        ns.declare_class("C", Arc::new(Class::new("C"))).is_err()
    });
    assert!(had_error);

    // An error was raised during parse, so the batch is never committed
    // (§7: "commit is refused if the [error] list is non-empty").
    program.with_root(|root| root.rollback());

    let committed = program.with_root(|root| root.find_child("X").and_then(|ns| ns.find_class("C")));
    assert!(committed.is_none());
}
