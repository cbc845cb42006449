//! Pure (non-mutating) value arithmetic for `Binary` expressions, mirroring
//! `strand_lvalue::helper`'s type-driven `op=` table (§4.1, §4.5) but
//! producing a new `Value` rather than writing one back through an lvalue.

use std::cmp::Ordering;
use std::sync::Arc;

use strand_ast::BinaryOp;
use strand_value::{hash::DuplicatePolicy, list::QList, Value};

use crate::error::EvalError;

/// `lhs op rhs` for every `BinaryOp` except the short-circuiting `And`/`Or`
/// (handled by the caller before either side is even evaluated) and the
/// relational/equality family (handled by `relational`/`equality` below).
pub fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (op, &lhs) {
        (BinaryOp::Add, Value::List(l)) => {
            let mut items = (**l).clone();
            match rhs {
                Value::List(other) => items = concat_lists(items, &other),
                other => items.push(other),
            }
            Ok(Value::List(Arc::new(items)))
        }
        (BinaryOp::Add, Value::Hash(h)) => {
            let mut merged = (**h).clone();
            if let Value::Hash(rh) = &rhs {
                merged.merge(rh, DuplicatePolicy::Overwrite);
            }
            Ok(Value::Hash(Arc::new(merged)))
        }
        (BinaryOp::Add, Value::String(_)) => {
            Ok(Value::string(format!("{}{}", lhs.as_string().as_str(), rhs.as_string().as_str())))
        }
        // Neither side is a list/hash/binary/date (those are handled above) but
        // the right side is a string: coerce left to string too rather than
        // treating it as 0 in numeric promotion (§8 scenario: foldl mixing
        // Int/Float/String must produce a concatenated string, not a number).
        (BinaryOp::Add, _) if matches!(rhs, Value::String(_)) => {
            Ok(Value::string(format!("{}{}", lhs.as_string().as_str(), rhs.as_string().as_str())))
        }
        (BinaryOp::Add, Value::Binary(b)) => {
            let mut combined = (**b).clone();
            if let Value::Binary(rb) = &rhs {
                combined.extend_from_slice(rb);
            }
            Ok(Value::Binary(Arc::new(combined)))
        }
        (BinaryOp::Add, Value::Date(d)) => {
            let rhs_date = rhs.as_date();
            d.add(&rhs_date).map(|v| Value::Date(Arc::new(v))).map_err(|_| EvalError::InvalidDateOperation("date addition"))
        }
        (BinaryOp::Sub, Value::Date(d)) => {
            let rhs_date = rhs.as_date();
            d.sub(&rhs_date).map(|v| Value::Date(Arc::new(v))).map_err(|_| EvalError::InvalidDateOperation("date subtraction"))
        }
        (BinaryOp::Sub, Value::Hash(h)) => {
            let mut reduced = (**h).clone();
            match &rhs {
                Value::String(s) => {
                    reduced.delete(&s.as_str());
                }
                Value::List(keys) => {
                    for k in keys.iter() {
                        reduced.delete(&k.as_string().as_str());
                    }
                }
                _ => {}
            }
            Ok(Value::Hash(Arc::new(reduced)))
        }
        _ => numeric_or_bitwise(op, &lhs, &rhs),
    }
}

fn concat_lists(mut items: QList, other: &QList) -> QList {
    for item in other.iter() {
        items.push(item.clone());
    }
    items
}

fn numeric_or_bitwise(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::BitAnd => Ok(Value::Int(lhs.as_int() & rhs.as_int())),
        BinaryOp::BitOr => Ok(Value::Int(lhs.as_int() | rhs.as_int())),
        BinaryOp::BitXor => Ok(Value::Int(lhs.as_int() ^ rhs.as_int())),
        BinaryOp::Shl => Ok(Value::Int(lhs.as_int() << (rhs.as_int() & 63))),
        BinaryOp::Shr => Ok(Value::Int(lhs.as_int() >> (rhs.as_int() & 63))),
        BinaryOp::Mod => {
            let b = rhs.as_int();
            if b == 0 {
                Ok(Value::Int(0))
            } else {
                Ok(Value::Int(lhs.as_int() % b))
            }
        }
        BinaryOp::Div => divide(lhs, rhs),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => Ok(apply_numeric(op, lhs, rhs)),
        other => unreachable!("{:?} is not an arithmetic/bitwise operator", other),
    }
}

fn is_zero(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.is_zero(),
        Value::Float(f) => *f == 0.0,
        _ => v.as_int() == 0,
    }
}

fn divide(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if is_zero(rhs) {
        return Err(EvalError::DivisionByZero);
    }
    Ok(apply_numeric(BinaryOp::Div, lhs, rhs))
}

/// Number > Float > Int promotion, same rank order as
/// `strand_value::equality` (§4.1).
fn apply_numeric(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    let uses_number = matches!(lhs, Value::Number(_)) || matches!(rhs, Value::Number(_));
    let uses_float = matches!(lhs, Value::Float(_)) || matches!(rhs, Value::Float(_));
    if uses_number {
        let a = lhs.as_number();
        let b = rhs.as_number();
        Value::Number(match op {
            BinaryOp::Add => a.add(&b),
            BinaryOp::Sub => a.sub(&b),
            BinaryOp::Mul => a.mul(&b),
            BinaryOp::Div => a.div(&b).unwrap_or(a),
            _ => a,
        })
    } else if uses_float {
        let a = lhs.as_float();
        let b = rhs.as_float();
        Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a,
        })
    } else {
        let a = lhs.as_int();
        let b = rhs.as_int();
        Value::Int(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a,
        })
    }
}

pub fn unary_neg(v: &Value) -> Value {
    match v {
        Value::Number(n) => Value::Number(strand_value::QNumber::from_i64(0).sub(n)),
        Value::Float(f) => Value::Float(-f),
        other => Value::Int(-other.as_int()),
    }
}

/// `relational_compare`'s ordering, exposed for `<`/`<=`/`>`/`>=` (§4.1).
pub fn relational(op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    let ord = strand_value::equality::relational_compare(lhs, rhs);
    match op {
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        other => unreachable!("{:?} is not a relational operator", other),
    }
}

/// Removes `source[offset..offset+length)` (list or string semantics) and
/// splices `replacement` in, returning the removed slice as a `Value`
/// (§4.5 `extract`). Works on an owned clone of the current value rather
/// than through a dedicated lvalue mutator, since `LValueHelper` only
/// exposes whole-value `current_value`/`assign` (no generic in-place
/// mutation hook) — the caller re-assigns the mutated clone back.
pub fn extract(current: Value, offset: i64, length: Option<i64>, replacement: Option<Value>) -> (Value, Value) {
    match current {
        Value::List(l) => {
            let mut owned = (*l).clone();
            let repl = match replacement {
                Some(Value::List(rl)) => Some((*rl).clone().into_vec()),
                Some(other) => Some(vec![other]),
                None => None,
            };
            let removed = owned.extract(offset, length, repl);
            (Value::List(Arc::new(owned)), Value::List(Arc::new(removed)))
        }
        Value::String(s) => {
            let text = s.as_str().into_owned();
            let chars: Vec<char> = text.chars().collect();
            let len = chars.len();
            let start = if offset < 0 { len.saturating_sub((-offset) as usize) } else { (offset as usize).min(len) };
            let count = match length {
                None => len - start,
                Some(l) if l < 0 => {
                    let end = len.saturating_sub((-l) as usize);
                    end.saturating_sub(start)
                }
                Some(l) => (l as usize).min(len - start),
            };
            let removed: String = chars[start..start + count].iter().collect();
            let repl_str = replacement.map(|v| v.as_string().as_str().into_owned()).unwrap_or_default();
            let mut rebuilt: String = chars[..start].iter().collect();
            rebuilt.push_str(&repl_str);
            rebuilt.push_str(&chars[start + count..].iter().collect::<String>());
            (Value::string(rebuilt), Value::string(removed))
        }
        other => (other, Value::Nothing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_promotes_int_to_float() {
        let v = arithmetic(BinaryOp::Add, Value::Int(1), Value::Float(2.5)).unwrap();
        assert_eq!(v, Value::Float(3.5));
    }

    #[test]
    fn add_concatenates_lists() {
        let v = arithmetic(BinaryOp::Add, Value::list(vec![Value::Int(1)]), Value::list(vec![Value::Int(2)])).unwrap();
        assert_eq!(v, Value::list(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn div_by_zero_is_an_error() {
        assert_eq!(arithmetic(BinaryOp::Div, Value::Int(1), Value::Int(0)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn relational_uses_numeric_promotion() {
        assert!(relational(BinaryOp::Lt, &Value::Int(1), &Value::string("2")));
    }

    #[test]
    fn extract_removes_and_replaces_a_list_slice() {
        let (remaining, removed) = extract(Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]), 1, Some(1), None);
        assert_eq!(remaining, Value::list(vec![Value::Int(1), Value::Int(3)]));
        assert_eq!(removed, Value::list(vec![Value::Int(2)]));
    }

    #[test]
    fn extract_removes_a_string_slice() {
        let (remaining, removed) = extract(Value::string("hello"), 1, Some(3), None);
        assert_eq!(remaining, Value::string("ho"));
        assert_eq!(removed, Value::string("ell"));
    }
}
