//! The tree-walking `Evaluator` (§4.5/§4.6/C5+C6): owns one thread's
//! execution state (scopes, closures, the current `self`, the implicit
//! `$1`/`$#` stack) and a shared `Arc<strand_resolver::Program>`.

use std::sync::Arc;

use strand_ast::{
    BinaryOp, CaseValue, CompoundOp, Expr, ExprKind, FunctionalOp, LValuePath, SortDirection, Stmt, StmtKind,
    SwitchCase, UnaryOp,
};
use strand_exception::{Exception, FrameKind, StackFrame};
use strand_lvalue::{Cell, LValueContext, ScopeStack};
use strand_resolver::Program;
use strand_value::{equality, hash::QHash, Callable, QObject, Value};

use crate::error::{to_exception, EvalError};
use crate::functions::FunctionTable;
use crate::implicit::ImplicitStack;
use crate::lvalue::{self, PathEval};
use crate::value_ops;

/// What a statement's execution produced: either it ran to completion
/// (`Normal`) or a `return` unwound the rest of the enclosing body
/// (`Return`). `exec_block` stops early on `Return` and propagates it
/// upward unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Evaluator {
    program: Arc<Program>,
    scopes: ScopeStack,
    closures: std::collections::HashMap<String, Cell>,
    current_self: Option<Arc<QObject>>,
    functions: FunctionTable,
    implicit: ImplicitStack,
}

impl LValueContext for Evaluator {
    fn local(&self, name: &str) -> Option<Cell> {
        self.scopes.lookup(name)
    }

    fn closure(&self, name: &str) -> Option<Cell> {
        self.closures.get(name).cloned()
    }

    fn global(&self, name: &str) -> Option<Cell> {
        self.program.global(name)
    }

    fn current_self(&self) -> Option<Arc<QObject>> {
        self.current_self.clone()
    }
}

impl PathEval for Evaluator {
    fn eval_to_value(&mut self, expr: &Expr) -> Result<Value, Exception> {
        self.eval_expr(expr)
    }
}

impl Evaluator {
    pub fn new(program: Arc<Program>) -> Self {
        Evaluator {
            program,
            scopes: ScopeStack::new(),
            closures: std::collections::HashMap::new(),
            current_self: None,
            functions: FunctionTable::new(),
            implicit: ImplicitStack::new(),
        }
    }

    pub fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Runs a method body with `self` bound both as `current_self` and as
    /// the conventional local variable `self`, so `self.x` lvalue paths
    /// resolve the same way any other `base.field` path does (§4.3).
    pub fn call_method(&mut self, object: Arc<QObject>, body: &[Stmt]) -> Result<Value, Exception> {
        self.scopes.push_block();
        self.scopes.declare("self", Value::Object(object.clone()));
        let previous_self = self.current_self.replace(object);
        let result = self.exec_block(body);
        self.current_self = previous_self;
        self.scopes.pop_block();
        match result? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::Nothing),
        }
    }

    // ---- statement execution -------------------------------------------------

    pub fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, Exception> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => continue,
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    fn stamp(&self, exc: Exception, stmt: &Stmt) -> Exception {
        let mut exc = exc;
        if let Some(loc) = &stmt.location {
            exc.push_frame(StackFrame::new(FrameKind::User, "<block>", loc.clone()));
        }
        exc
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, Exception> {
        match &stmt.kind {
            StmtKind::Expression(e) => {
                self.eval_expr(e)?;
                Ok(Flow::Normal)
            }
            StmtKind::Block(body) => {
                self.scopes.push_block();
                let result = self.exec_block(body);
                self.scopes.pop_block();
                result
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                if self.eval_bool(cond)? {
                    self.scopes.push_block();
                    let result = self.exec_block(then_branch);
                    self.scopes.pop_block();
                    result
                } else if let Some(else_branch) = else_branch {
                    self.scopes.push_block();
                    let result = self.exec_block(else_branch);
                    self.scopes.pop_block();
                    result
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::Return(value) => {
                let v = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Nothing,
                };
                Ok(Flow::Return(v))
            }
            StmtKind::Throw { err, desc, arg } => {
                let err_value = self.eval_expr(err)?;
                let desc_value = self.eval_expr(desc)?.as_string().as_str().into_owned();
                let arg_value = match arg {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Nothing,
                };
                Err(Exception::user(err_value, desc_value, arg_value))
            }
            StmtKind::TryCatch { body, catch_binding, catch_body } => self.exec_try_catch(body, catch_binding, catch_body),
            StmtKind::Foreach { binding, source, source_lvalue, body } => {
                self.exec_foreach(binding, source, source_lvalue.as_ref(), body)
            }
            StmtKind::Context { source, where_filter, sort_key, body } => {
                self.exec_context(source, where_filter.as_ref(), sort_key.as_ref(), body)
            }
            StmtKind::Switch { scrutinee, cases, default } => self.exec_switch_stmt(scrutinee, cases, default.as_deref()),
        }
        .map_err(|e| self.stamp(e, stmt))
    }

    fn exec_try_catch(
        &mut self,
        body: &[Stmt],
        catch_binding: &Option<String>,
        catch_body: &[Stmt],
    ) -> Result<Flow, Exception> {
        self.scopes.push_block();
        let result = self.exec_block(body);
        self.scopes.pop_block();
        match result {
            Ok(flow) => Ok(flow),
            Err(exc) => {
                self.scopes.push_block();
                if let Some(name) = catch_binding {
                    self.scopes.declare(name.clone(), exception_to_hash(&exc));
                }
                let result = self.exec_block(catch_body);
                self.scopes.pop_block();
                result
            }
        }
    }

    /// Iterates `source`: a `List` iterates its elements by index, any
    /// other value runs the body exactly once with that value bound
    /// (`Value::Object` included — full iterator-protocol dispatch through
    /// a class's `next()`/`getValue()` methods isn't wired into this
    /// evaluator, so an object source is treated as a single element).
    fn exec_foreach(
        &mut self,
        binding: &str,
        source: &Expr,
        source_lvalue: &Option<LValuePath>,
        body: &[Stmt],
    ) -> Result<Flow, Exception> {
        let source_value = self.eval_expr(source)?;
        let items: Vec<Value> = match &source_value {
            Value::List(l) => l.iter().cloned().collect(),
            Value::Nothing => Vec::new(),
            other => vec![other.clone()],
        };
        for (idx, item) in items.into_iter().enumerate() {
            self.scopes.push_block();
            self.scopes.declare(binding.to_string(), item);
            let flow = self.exec_block(body);
            let final_value = self.scopes.lookup(binding).map(|c| c.lock().clone());
            self.scopes.pop_block();
            if let (Some(path), Some(value)) = (source_lvalue, final_value) {
                let index_path = LValuePath::ListIndex {
                    base: Box::new(path.clone()),
                    index: Box::new(Expr::new(ExprKind::Literal(Value::Int(idx as i64)))),
                };
                lvalue::locate(self, &index_path)?.assign(value).map_err(|e| to_exception(e, None))?;
            }
            match flow? {
                Flow::Normal => continue,
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    /// `context`/`subcontext` (§4.5): each row of `source` (a `Hash`, or a
    /// `List` of `Hash` rows) is exposed as ordinary local-scope bindings —
    /// one per key — for the duration of the filter/sort-key/body
    /// evaluation. There's no dedicated `%name`-reference AST node, so this
    /// is the most faithful reading of "row fields visible unqualified"
    /// available from this node set.
    fn exec_context(
        &mut self,
        source: &Expr,
        where_filter: Option<&Expr>,
        sort_key: Option<&(Expr, SortDirection)>,
        body: &[Stmt],
    ) -> Result<Flow, Exception> {
        let source_value = self.eval_expr(source)?;
        let mut rows: Vec<QHash> = match source_value {
            Value::List(l) => l.iter().filter_map(row_hash).collect(),
            Value::Hash(h) => vec![(*h).clone()],
            _ => Vec::new(),
        };

        if let Some((key_expr, direction)) = sort_key {
            let mut keyed: Vec<(Value, QHash)> = Vec::with_capacity(rows.len());
            for row in rows.drain(..) {
                let key = self.with_row_scope(&row, |ev| ev.eval_expr(key_expr))?;
                keyed.push((key, row));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                let ord = equality::compare_ordering(a, b);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }

        for row in rows {
            if let Some(filter) = where_filter {
                let keep = self.with_row_scope(&row, |ev| ev.eval_bool(filter))?;
                if !keep {
                    continue;
                }
            }
            self.scopes.push_block();
            for key in row.keys() {
                let value = row.get(key).cloned().unwrap_or(Value::Nothing);
                self.scopes.declare(key.clone(), value);
            }
            let flow = self.exec_block(body);
            self.scopes.pop_block();
            match flow? {
                Flow::Normal => continue,
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    fn with_row_scope<R>(&mut self, row: &QHash, f: impl FnOnce(&mut Self) -> Result<R, Exception>) -> Result<R, Exception> {
        self.scopes.push_block();
        for key in row.keys() {
            let value = row.get(key).cloned().unwrap_or(Value::Nothing);
            self.scopes.declare(key.clone(), value);
        }
        let result = f(self);
        self.scopes.pop_block();
        result
    }

    fn exec_switch_stmt(
        &mut self,
        scrutinee: &Expr,
        cases: &[SwitchCase],
        default: Option<&[Stmt]>,
    ) -> Result<Flow, Exception> {
        let scrutinee_value = self.eval_expr(scrutinee)?;
        for case in cases {
            if self.case_matches(&scrutinee_value, &case.value)? {
                self.scopes.push_block();
                let result = self.exec_block(&case.body);
                self.scopes.pop_block();
                return result;
            }
        }
        if let Some(default) = default {
            self.scopes.push_block();
            let result = self.exec_block(default);
            self.scopes.pop_block();
            return result;
        }
        Ok(Flow::Normal)
    }

    fn case_matches(&mut self, scrutinee: &Value, case: &CaseValue) -> Result<bool, Exception> {
        match case {
            CaseValue::Value(e) => Ok(equality::compare_hard(scrutinee, &self.eval_expr(e)?)),
            CaseValue::Relational(op, e) => {
                Ok(value_ops::relational(*op, scrutinee, &self.eval_expr(e)?))
            }
            CaseValue::Regex(pattern) => match pattern {
                Value::Regex(r) => Ok(strand_regex::ops::matches(r, &scrutinee.as_string().as_str())),
                _ => Err(to_exception(EvalError::InvalidRegexPayload("switch case"), None)),
            },
        }
    }

    // ---- expression evaluation ------------------------------------------------

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Exception> {
        if let ExprKind::Literal(v) = &expr.kind {
            return Ok(v.clone());
        }
        self.eval_expr_uncached(expr)
    }

    /// `+=`-style fast path entry points (§4.5: "four fast-path entry
    /// points ... to avoid boxing") — thin wrappers that special-case the
    /// literal shape before falling back to the general dispatch.
    pub fn eval_bigint(&mut self, expr: &Expr) -> Result<i64, Exception> {
        if let ExprKind::Literal(Value::Int(i)) = &expr.kind {
            return Ok(*i);
        }
        Ok(self.eval_expr(expr)?.as_int())
    }

    pub fn eval_int(&mut self, expr: &Expr) -> Result<i64, Exception> {
        self.eval_bigint(expr)
    }

    pub fn eval_float(&mut self, expr: &Expr) -> Result<f64, Exception> {
        if let ExprKind::Literal(Value::Float(f)) = &expr.kind {
            return Ok(*f);
        }
        Ok(self.eval_expr(expr)?.as_float())
    }

    pub fn eval_bool(&mut self, expr: &Expr) -> Result<bool, Exception> {
        if let ExprKind::Literal(Value::Bool(b)) = &expr.kind {
            return Ok(*b);
        }
        Ok(self.eval_expr(expr)?.as_bool())
    }

    fn eval_expr_uncached(&mut self, expr: &Expr) -> Result<Value, Exception> {
        match &expr.kind {
            ExprKind::Literal(v) => Ok(v.clone()),
            ExprKind::LValue(path) => lvalue::read_path(self, path),
            ExprKind::Unary(op, operand) => self.eval_unary(*op, operand),
            ExprKind::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs),
            ExprKind::Ternary(cond, then_e, else_e) => {
                if self.eval_bool(cond)? {
                    self.eval_expr(then_e)
                } else {
                    self.eval_expr(else_e)
                }
            }
            ExprKind::Assign(path, value) => {
                let v = self.eval_expr(value)?;
                lvalue::locate(self, path)?.assign(v.clone()).map_err(|e| to_exception(e, None))?;
                Ok(v)
            }
            ExprKind::CompoundAssign(path, op, value) => self.eval_compound_assign(path, *op, value),
            ExprKind::Extract { target, offset, length, replacement } => {
                self.eval_extract(target, offset, length.as_deref(), replacement.as_deref())
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::RefArg(path) => {
                let resolved = lvalue::locate(self, path)?;
                resolved.current_value().map_err(|e| to_exception(e, None))
            }
            ExprKind::Functional { op, source, body, predicate, key_body } => {
                self.eval_functional(*op, source, body, predicate.as_deref(), key_body.as_deref())
            }
            ExprKind::RegexMatch { target, pattern } => {
                let target_value = self.eval_expr(target)?;
                match pattern {
                    Value::Regex(r) => Ok(Value::Bool(strand_regex::ops::matches(r, &target_value.as_string().as_str()))),
                    _ => Err(to_exception(EvalError::InvalidRegexPayload("regex match"), expr.location.as_ref())),
                }
            }
            ExprKind::RegexSubstitute { target, pattern, template: _ } => match pattern {
                Value::RegexSubst(subst) => {
                    let current = lvalue::locate(self, target)?;
                    let text = current.current_value().map_err(|e| to_exception(e, None))?.as_string().as_str().into_owned();
                    let replaced = strand_regex::ops::substitute(subst, &text);
                    current.assign(Value::string(replaced.clone())).map_err(|e| to_exception(e, None))?;
                    Ok(Value::string(replaced))
                }
                _ => Err(to_exception(EvalError::InvalidRegexPayload("regex substitute"), expr.location.as_ref())),
            },
            ExprKind::Transliterate { target, table } => match table {
                Value::Transliteration(t) => {
                    let current = lvalue::locate(self, target)?;
                    let bytes = current.current_value().map_err(|e| to_exception(e, None))?.as_string().as_bytes().to_vec();
                    let replaced = t.execute(&bytes);
                    let replaced_str = String::from_utf8_lossy(&replaced).into_owned();
                    current.assign(Value::string(replaced_str.clone())).map_err(|e| to_exception(e, None))?;
                    Ok(Value::string(replaced_str))
                }
                _ => Err(to_exception(EvalError::InvalidRegexPayload("transliterate"), expr.location.as_ref())),
            },
            ExprKind::ImplicitElement(n) => Ok(self.implicit.element(*n)),
            ExprKind::ImplicitIndex => Ok(self.implicit.index()),
            ExprKind::Switch { scrutinee, cases, default } => self.eval_switch_expr(scrutinee, cases, default.as_deref()),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, Exception> {
        let v = self.eval_expr(operand)?;
        Ok(match op {
            UnaryOp::Neg => value_ops::unary_neg(&v),
            UnaryOp::Not => Value::Bool(!v.as_bool()),
            UnaryOp::BitNot => Value::Int(!v.as_int()),
        })
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, Exception> {
        match op {
            BinaryOp::And => {
                let l = self.eval_bool(lhs)?;
                if !l {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_bool(rhs)?))
            }
            BinaryOp::Or => {
                let l = self.eval_bool(lhs)?;
                if l {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_bool(rhs)?))
            }
            BinaryOp::EqSoft => Ok(Value::Bool(equality::compare_soft(&self.eval_expr(lhs)?, &self.eval_expr(rhs)?))),
            BinaryOp::NeSoft => Ok(Value::Bool(!equality::compare_soft(&self.eval_expr(lhs)?, &self.eval_expr(rhs)?))),
            BinaryOp::EqHard => Ok(Value::Bool(equality::compare_hard(&self.eval_expr(lhs)?, &self.eval_expr(rhs)?))),
            BinaryOp::NeHard => Ok(Value::Bool(!equality::compare_hard(&self.eval_expr(lhs)?, &self.eval_expr(rhs)?))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                Ok(Value::Bool(value_ops::relational(op, &l, &r)))
            }
            BinaryOp::Div => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                value_ops::arithmetic(op, l, r).map_err(|e| to_exception(e, None))
            }
            _ => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                value_ops::arithmetic(op, l, r).map_err(|e| to_exception(e, None))
            }
        }
    }

    fn eval_compound_assign(&mut self, path: &LValuePath, op: CompoundOp, value: &Expr) -> Result<Value, Exception> {
        let rhs = self.eval_expr(value)?;
        if op == CompoundOp::Div && value_ops_is_zero(&rhs) {
            return Err(to_exception(EvalError::DivisionByZero, None));
        }
        let helper = lvalue::locate(self, path)?;
        helper.apply_compound(op, rhs).map_err(|e| to_exception(e, None))?;
        helper.current_value().map_err(|e| to_exception(e, None))
    }

    fn eval_extract(
        &mut self,
        target: &LValuePath,
        offset: &Expr,
        length: Option<&Expr>,
        replacement: Option<&Expr>,
    ) -> Result<Value, Exception> {
        let offset_value = self.eval_bigint(offset)?;
        let length_value = match length {
            Some(e) => Some(self.eval_bigint(e)?),
            None => None,
        };
        let replacement_value = match replacement {
            Some(e) => Some(self.eval_expr(e)?),
            None => None,
        };
        let helper = lvalue::locate(self, target)?;
        let current = helper.current_value().map_err(|e| to_exception(e, None))?;
        let (remaining, removed) = value_ops::extract(current, offset_value, length_value, replacement_value);
        helper.assign(remaining).map_err(|e| to_exception(e, None))?;
        Ok(removed)
    }

    fn eval_call(&mut self, callee: &str, args: &[Expr]) -> Result<Value, Exception> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        let callable = self
            .functions
            .lookup(callee)
            .ok_or_else(|| to_exception(EvalError::UnresolvedFunction(callee.to_string()), None))?;
        callable.invoke(values).map_err(|core| {
            let mut exc = Exception::new(core);
            exc.push_frame(StackFrame::new(FrameKind::Builtin, callee.to_string(), Default::default()));
            exc
        })
    }

    fn eval_functional(
        &mut self,
        op: FunctionalOp,
        source: &Expr,
        body: &Expr,
        predicate: Option<&Expr>,
        key_body: Option<&Expr>,
    ) -> Result<Value, Exception> {
        let source_value = self.eval_expr(source)?;
        match op {
            FunctionalOp::Map => match source_value {
                Value::List(l) => {
                    let mut out = Vec::with_capacity(l.as_slice().len());
                    for (idx, item) in l.iter().enumerate() {
                        let _guard = self.implicit.push(vec![item.clone()], idx as i64);
                        out.push(self.eval_expr(body)?);
                    }
                    Ok(Value::list(out))
                }
                // `map e, nothing` yields `Nothing` without evaluating `body`.
                Value::Nothing => Ok(Value::Nothing),
                other => {
                    let _guard = self.implicit.push(vec![other], 0);
                    self.eval_expr(body)
                }
            },
            FunctionalOp::MapSelect | FunctionalOp::Select => {
                let predicate = predicate.expect("MapSelect/Select always carry a predicate");
                let items: Vec<Value> = match source_value {
                    Value::List(l) => l.iter().cloned().collect(),
                    other => vec![other],
                };
                let mut out = Vec::new();
                for (idx, item) in items.into_iter().enumerate() {
                    let _guard = self.implicit.push(vec![item.clone()], idx as i64);
                    if self.eval_bool(predicate)? {
                        let result = if matches!(op, FunctionalOp::MapSelect) { self.eval_expr(body)? } else { item };
                        out.push(result);
                    }
                }
                Ok(Value::list(out))
            }
            FunctionalOp::FoldL | FunctionalOp::FoldR => {
                let mut items: Vec<Value> = match source_value {
                    Value::List(l) => l.iter().cloned().collect(),
                    other => vec![other],
                };
                if matches!(op, FunctionalOp::FoldR) {
                    items.reverse();
                }
                if items.len() < 2 {
                    return Ok(items.into_iter().next().unwrap_or(Value::Nothing));
                }
                let mut iter = items.into_iter();
                let mut acc = iter.next().expect("len >= 2");
                for (idx, next) in iter.enumerate() {
                    let _guard = self.implicit.push(vec![acc, next], idx as i64);
                    acc = self.eval_expr(body)?;
                }
                Ok(acc)
            }
            FunctionalOp::HashMap => {
                let key_body = key_body.expect("HashMap always carries a key_body");
                let items: Vec<Value> = match source_value {
                    Value::List(l) => l.iter().cloned().collect(),
                    other => vec![other],
                };
                let mut result = QHash::new();
                for (idx, item) in items.into_iter().enumerate() {
                    let _guard = self.implicit.push(vec![item], idx as i64);
                    let key = self.eval_expr(key_body)?.as_string().as_str().into_owned();
                    let value = self.eval_expr(body)?;
                    result.set(&key, value);
                }
                Ok(Value::hash(result))
            }
        }
    }

    fn eval_switch_expr(&mut self, scrutinee: &Expr, cases: &[(Expr, Expr)], default: Option<&Expr>) -> Result<Value, Exception> {
        let scrutinee_value = self.eval_expr(scrutinee)?;
        for (case_expr, result_expr) in cases {
            let case_value = self.eval_expr(case_expr)?;
            if equality::compare_hard(&scrutinee_value, &case_value) {
                return self.eval_expr(result_expr);
            }
        }
        match default {
            Some(e) => self.eval_expr(e),
            None => Ok(Value::Nothing),
        }
    }
}

fn value_ops_is_zero(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.is_zero(),
        Value::Float(f) => *f == 0.0,
        _ => v.as_int() == 0,
    }
}

fn row_hash(v: &Value) -> Option<QHash> {
    match v {
        Value::Hash(h) => Some((**h).clone()),
        _ => None,
    }
}

fn exception_to_hash(exc: &Exception) -> Value {
    let mut h = QHash::new();
    h.set("err", Value::string(exc.core.err.clone()));
    h.set("desc", Value::string(exc.core.desc.clone()));
    h.set("arg", exc.core.arg.clone());
    h.set(
        "kind",
        Value::string(match exc.kind() {
            strand_value::ExceptionKind::System => "system",
            strand_value::ExceptionKind::User => "user",
        }),
    );
    Value::hash(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_ast::builder::*;

    fn new_eval() -> Evaluator {
        Evaluator::new(Program::new())
    }

    #[test]
    fn arithmetic_and_local_assignment() {
        let mut ev = new_eval();
        ev.scopes.declare("x", Value::Int(1));
        let expr = assign(LValuePath::Local("x".to_string()), bin(BinaryOp::Add, local("x"), lit_int(41)));
        let result = ev.eval_expr(&expr).unwrap();
        assert_eq!(result, Value::Int(42));
        assert_eq!(*ev.scopes.lookup("x").unwrap().lock(), Value::Int(42));
    }

    #[test]
    fn division_by_zero_raises_before_touching_lvalue_helper() {
        let mut ev = new_eval();
        ev.scopes.declare("x", Value::Int(10));
        let expr = compound_assign(LValuePath::Local("x".to_string()), CompoundOp::Div, lit_int(0));
        let err = ev.eval_expr(&expr).unwrap_err();
        assert_eq!(err.core.err, "DIVISION-BY-ZERO");
    }

    #[test]
    fn foldl_sums_a_list() {
        let mut ev = new_eval();
        let source = lit(Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        let body = bin(BinaryOp::Add, implicit_element_n(1), implicit_element_n(2));
        let expr = foldl_op(source, body);
        assert_eq!(ev.eval_expr(&expr).unwrap(), Value::Int(6));
    }

    #[test]
    fn map_over_single_value_short_circuits_without_wrapping() {
        let mut ev = new_eval();
        let expr = map_op(lit_int(5), bin(BinaryOp::Mul, implicit_element_n(1), lit_int(2)));
        assert_eq!(ev.eval_expr(&expr).unwrap(), Value::Int(10));
    }

    #[test]
    fn map_over_nothing_yields_nothing_without_evaluating_body() {
        let mut ev = new_eval();
        // A body that would error if it were ever evaluated, to prove the
        // `Nothing` source short-circuits before `body` runs.
        let body = bin(BinaryOp::Div, implicit_element_n(1), lit_int(0));
        let expr = map_op(lit(Value::Nothing), body);
        assert_eq!(ev.eval_expr(&expr).unwrap(), Value::Nothing);
    }

    #[test]
    fn select_filters_a_list_by_predicate() {
        let mut ev = new_eval();
        let source = lit(Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]));
        let predicate = bin(BinaryOp::EqHard, bin(BinaryOp::Mod, implicit_element_n(1), lit_int(2)), lit_int(0));
        let expr = select_op(source, predicate);
        assert_eq!(ev.eval_expr(&expr).unwrap(), Value::list(vec![Value::Int(2), Value::Int(4)]));
    }

    #[test]
    fn try_catch_binds_exception_fields() {
        let mut ev = new_eval();
        let body = vec![throw_stmt(lit_str("BOOM"), lit_str("went boom"), None)];
        let catch_body = vec![return_stmt(Some(hash_key_err(local("e"))))];
        let stmt = try_catch_stmt(body, Some("e".to_string()), catch_body);
        let flow = ev.exec_stmt(&stmt).unwrap();
        assert_eq!(flow, Flow::Return(Value::string("BOOM")));
    }

    fn hash_key_err(base: Expr) -> Expr {
        match base.kind {
            ExprKind::LValue(path) => lvalue(hash_key_path(path, lit_str("err"))),
            _ => panic!("expected lvalue"),
        }
    }

    #[test]
    fn foreach_writes_mutated_elements_back_through_source_lvalue() {
        let mut ev = new_eval();
        ev.scopes.declare("xs", Value::list(vec![Value::Int(1), Value::Int(2)]));
        let body = vec![expr_stmt(assign(
            LValuePath::Local("item".to_string()),
            bin(BinaryOp::Add, local("item"), lit_int(10)),
        ))];
        let stmt = foreach_stmt_ref("item", local("xs"), LValuePath::Local("xs".to_string()), body);
        ev.exec_stmt(&stmt).unwrap();
        assert_eq!(*ev.scopes.lookup("xs").unwrap().lock(), Value::list(vec![Value::Int(11), Value::Int(12)]));
    }

    #[test]
    fn switch_stmt_falls_through_to_default() {
        let mut ev = new_eval();
        let cases = vec![(CaseValue::Value(lit_int(1)), vec![return_stmt(Some(lit_str("one")))])];
        let stmt = switch_stmt(lit_int(9), cases, Some(vec![return_stmt(Some(lit_str("fallback")))]));
        let flow = ev.exec_stmt(&stmt).unwrap();
        assert_eq!(flow, Flow::Return(Value::string("fallback")));
    }
}
