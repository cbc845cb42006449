//! Ergonomic free functions for constructing `Expr`/`Stmt` trees without a
//! parser (§4.12). Used by tests, the CLI demo, and nowhere else — a real
//! front end would build `Expr`/`Stmt` directly.

use strand_value::Value;

use crate::expr::{BinaryOp, CompoundOp, Expr, ExprKind, FunctionalOp, LValuePath, UnaryOp};
use crate::stmt::{CaseValue, Stmt, StmtKind, SwitchCase};

pub fn lit_int(i: i64) -> Expr {
    Expr::new(ExprKind::Literal(Value::Int(i)))
}

pub fn lit_float(f: f64) -> Expr {
    Expr::new(ExprKind::Literal(Value::Float(f)))
}

pub fn lit_bool(b: bool) -> Expr {
    Expr::new(ExprKind::Literal(Value::Bool(b)))
}

pub fn lit_str(s: impl Into<String>) -> Expr {
    Expr::new(ExprKind::Literal(Value::string(s)))
}

pub fn lit(v: Value) -> Expr {
    Expr::new(ExprKind::Literal(v))
}

pub fn local(name: impl Into<String>) -> Expr {
    Expr::new(ExprKind::LValue(LValuePath::Local(name.into())))
}

pub fn closure(name: impl Into<String>) -> Expr {
    Expr::new(ExprKind::LValue(LValuePath::Closure(name.into())))
}

pub fn global(name: impl Into<String>) -> Expr {
    Expr::new(ExprKind::LValue(LValuePath::Global(name.into())))
}

/// `base.name`, where `base` is itself an lvalue path (§4.3).
pub fn member_path(base: LValuePath, name: impl Into<String>) -> LValuePath {
    LValuePath::Member { base: Box::new(base), name: name.into() }
}

pub fn hash_key_path(base: LValuePath, key: Expr) -> LValuePath {
    LValuePath::HashKey { base: Box::new(base), key: Box::new(key) }
}

pub fn list_index_path(base: LValuePath, index: Expr) -> LValuePath {
    LValuePath::ListIndex { base: Box::new(base), index: Box::new(index) }
}

pub fn lvalue(path: LValuePath) -> Expr {
    Expr::new(ExprKind::LValue(path))
}

pub fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)))
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::new(ExprKind::Unary(op, Box::new(operand)))
}

pub fn ternary(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::new(ExprKind::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)))
}

pub fn assign(target: LValuePath, value: Expr) -> Expr {
    Expr::new(ExprKind::Assign(target, Box::new(value)))
}

pub fn compound_assign(target: LValuePath, op: CompoundOp, value: Expr) -> Expr {
    Expr::new(ExprKind::CompoundAssign(target, op, Box::new(value)))
}

pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Call { callee: callee.into(), args })
}

pub fn ref_arg(path: LValuePath) -> Expr {
    Expr::new(ExprKind::RefArg(path))
}

pub fn extract_expr(target: LValuePath, offset: Expr, length: Option<Expr>, replacement: Option<Expr>) -> Expr {
    Expr::new(ExprKind::Extract {
        target,
        offset: Box::new(offset),
        length: length.map(Box::new),
        replacement: replacement.map(Box::new),
    })
}

pub fn regex_match(target: Expr, pattern: Value) -> Expr {
    Expr::new(ExprKind::RegexMatch { target: Box::new(target), pattern })
}

pub fn regex_substitute(target: LValuePath, pattern: Value, template: impl Into<String>) -> Expr {
    Expr::new(ExprKind::RegexSubstitute { target, pattern, template: template.into() })
}

pub fn transliterate(target: LValuePath, table: Value) -> Expr {
    Expr::new(ExprKind::Transliterate { target, table })
}

pub fn switch_expr(scrutinee: Expr, cases: Vec<(Expr, Expr)>, default: Option<Expr>) -> Expr {
    Expr::new(ExprKind::Switch { scrutinee: Box::new(scrutinee), cases, default: default.map(Box::new) })
}

/// `map`/`map-select`/`select`/`foldl`/`foldr`/`hashmap` (§4.6).
pub fn map_op(source: Expr, body: Expr) -> Expr {
    functional(FunctionalOp::Map, source, body, None, None)
}

pub fn map_select_op(source: Expr, body: Expr, predicate: Expr) -> Expr {
    functional(FunctionalOp::MapSelect, source, body, Some(predicate), None)
}

pub fn select_op(source: Expr, predicate: Expr) -> Expr {
    functional(FunctionalOp::Select, source, predicate.clone(), Some(predicate), None)
}

pub fn foldl_op(source: Expr, body: Expr) -> Expr {
    functional(FunctionalOp::FoldL, source, body, None, None)
}

pub fn foldr_op(source: Expr, body: Expr) -> Expr {
    functional(FunctionalOp::FoldR, source, body, None, None)
}

pub fn hashmap_op(source: Expr, key_body: Expr, value_body: Expr) -> Expr {
    functional(FunctionalOp::HashMap, source, value_body, None, Some(key_body))
}

fn functional(op: FunctionalOp, source: Expr, body: Expr, predicate: Option<Expr>, key_body: Option<Expr>) -> Expr {
    Expr::new(ExprKind::Functional {
        op,
        source: Box::new(source),
        body: Box::new(body),
        predicate: predicate.map(Box::new),
        key_body: key_body.map(Box::new),
    })
}

pub fn implicit_element() -> Expr {
    Expr::new(ExprKind::ImplicitElement(1))
}

pub fn implicit_element_n(n: u8) -> Expr {
    Expr::new(ExprKind::ImplicitElement(n))
}

pub fn implicit_index() -> Expr {
    Expr::new(ExprKind::ImplicitIndex)
}

pub fn expr_stmt(e: Expr) -> Stmt {
    Stmt::new(StmtKind::Expression(e))
}

pub fn if_stmt(cond: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>>) -> Stmt {
    Stmt::new(StmtKind::If { cond, then_branch, else_branch })
}

pub fn foreach_stmt(binding: impl Into<String>, source: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Foreach { binding: binding.into(), source, source_lvalue: None, body })
}

/// `foreach $binding in (\source) { body }`: re-assigns each possibly
/// modified element back into `source_lvalue` after the iteration runs.
pub fn foreach_stmt_ref(
    binding: impl Into<String>,
    source: Expr,
    source_lvalue: LValuePath,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::new(StmtKind::Foreach { binding: binding.into(), source, source_lvalue: Some(source_lvalue), body })
}

pub fn context_stmt(
    source: Expr,
    where_filter: Option<Expr>,
    sort_key: Option<(Expr, crate::stmt::SortDirection)>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::new(StmtKind::Context { source, where_filter, sort_key, body })
}

pub fn switch_stmt(scrutinee: Expr, cases: Vec<(CaseValue, Vec<Stmt>)>, default: Option<Vec<Stmt>>) -> Stmt {
    Stmt::new(StmtKind::Switch {
        scrutinee,
        cases: cases.into_iter().map(|(value, body)| SwitchCase { value, body }).collect(),
        default,
    })
}

pub fn throw_stmt(err: Expr, desc: Expr, arg: Option<Expr>) -> Stmt {
    Stmt::new(StmtKind::Throw { err, desc, arg })
}

pub fn try_catch_stmt(body: Vec<Stmt>, catch_binding: Option<String>, catch_body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::TryCatch { body, catch_binding, catch_body })
}

pub fn return_stmt(value: Option<Expr>) -> Stmt {
    Stmt::new(StmtKind::Return(value))
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Block(stmts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_small_arithmetic_tree() {
        let tree = bin(BinaryOp::Add, lit_int(1), bin(BinaryOp::Mul, lit_int(2), lit_int(3)));
        match tree.kind {
            ExprKind::Binary(BinaryOp::Add, lhs, rhs) => {
                assert_eq!(*lhs, lit_int(1));
                assert!(matches!(rhs.kind, ExprKind::Binary(BinaryOp::Mul, _, _)));
            }
            _ => panic!("expected Binary Add"),
        }
    }

    #[test]
    fn builds_a_foldl_over_a_list() {
        let source = lit(Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        let body = bin(BinaryOp::Add, implicit_element_n(1), implicit_element_n(2));
        let tree = foldl_op(source, body);
        assert!(matches!(tree.kind, ExprKind::Functional { op: FunctionalOp::FoldL, .. }));
    }
}
