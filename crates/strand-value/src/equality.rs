//! Soft/hard equality and the numeric promotion matrix (§4.1).

use std::cmp::Ordering;

use crate::value::Value;

/// Hard equality: identical variant tag and exact structural equality;
/// singletons compare by identity (trivially true for unit-like variants).
pub fn compare_hard(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nothing, Value::Nothing) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Binary(x), Value::Binary(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::List(x), Value::List(y)) => list_hard(x, y),
        (Value::Hash(x), Value::Hash(y)) => x.compare_hard(y),
        (Value::Object(x), Value::Object(y)) => std::sync::Arc::ptr_eq(x, y),
        (Value::CallReference(x), Value::CallReference(y)) => std::sync::Arc::ptr_eq(x, y),
        (Value::Reference(x), Value::Reference(y)) => std::sync::Arc::ptr_eq(x, y),
        (Value::Regex(x), Value::Regex(y)) => x == y,
        (Value::RegexSubst(x), Value::RegexSubst(y)) => x == y,
        (Value::Transliteration(x), Value::Transliteration(y)) => x == y,
        _ => false,
    }
}

fn list_hard(a: &crate::list::QList, b: &crate::list::QList) -> bool {
    a.as_slice().len() == b.as_slice().len()
        && a.as_slice().iter().zip(b.as_slice().iter()).all(|(x, y)| compare_hard(x, y))
}

/// Soft equality: numeric promotion and encoding conversion for strings;
/// dates compare by represented instant; collections compare element-wise
/// with soft equality (§4.1).
pub fn compare_soft(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nothing, Value::Nothing) => true,
        (Value::Null, Value::Null) => true,
        (Value::List(x), Value::List(y)) => x.compare_soft(y),
        (Value::Hash(x), Value::Hash(y)) => x.compare_soft(y),
        (Value::Date(x), Value::Date(y)) => x.compare(y).map(|o| o == Ordering::Equal).unwrap_or(false),
        _ if both_strings(a, b) => string_compare(a, b) == Ordering::Equal,
        // A numeric-kind value (Number/Float/Int/Bool) on either side wins
        // promotion even against a String: `1 == "1.0"` and `"1" == True`
        // both resolve through numeric coercion of the string, not a
        // byte-lexicographic string compare (§8 testable properties).
        _ if is_numericish(a) && (is_numericish(b) || matches!(b, Value::String(_))) => {
            numeric_compare(a, b) == Ordering::Equal
        }
        _ if is_numericish(b) && matches!(a, Value::String(_)) => numeric_compare(a, b) == Ordering::Equal,
        _ if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) => {
            string_compare(a, b) == Ordering::Equal
        }
        _ => compare_hard(a, b),
    }
}

fn both_strings(a: &Value, b: &Value) -> bool {
    matches!(a, Value::String(_)) && matches!(b, Value::String(_))
}

fn is_numericish(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::Float(_) | Value::Int(_) | Value::Bool(_))
}

fn numeric_compare(a: &Value, b: &Value) -> Ordering {
    if matches!(a, Value::Number(_)) || matches!(b, Value::Number(_)) {
        return a.as_number().cmp(&b.as_number());
    }
    if matches!(a, Value::Float(_)) || matches!(b, Value::Float(_)) {
        return a.as_float().partial_cmp(&b.as_float()).unwrap_or(Ordering::Equal);
    }
    a.as_int().cmp(&b.as_int())
}

fn string_compare(a: &Value, b: &Value) -> Ordering {
    let left_encoding = crate::value::encoding_of(a);
    let a_str = a.as_string();
    let b_bytes = match b {
        Value::String(s) => s.transcode_to(left_encoding).map(|t| t.as_bytes().to_vec()).unwrap_or_else(|_| b.as_string().as_bytes().to_vec()),
        other => other.as_string().as_bytes().to_vec(),
    };
    a_str.as_bytes().cmp(&b_bytes)
}

/// The default sort comparator used by `List::sort_default` (§4.2.2):
/// numeric kinds compare numerically, strings compare byte-lexicographic
/// after transcoding, dates compare by instant.
pub fn compare_ordering(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Date(x), Value::Date(y)) => x.compare(y).unwrap_or(Ordering::Equal),
        _ if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) => string_compare(a, b),
        _ if is_numericish(a) && is_numericish(b) => numeric_compare(a, b),
        _ => Ordering::Equal,
    }
}

/// The relational-operator promotion matrix (§4.1): Number > Float >
/// Int/Bool > String > Date. Strings fail with an encoding error if the
/// other side cannot be transcoded into the left side's encoding; callers
/// that need that failure mode should prefer `Value::as_string` plus
/// `QString::transcode_to` directly. This entry point never fails because
/// `as_string` always succeeds (it falls back to display formatting).
pub fn relational_compare(a: &Value, b: &Value) -> Ordering {
    if let (Value::Date(x), Value::Date(y)) = (a, b) {
        return x.compare(y).unwrap_or(Ordering::Equal);
    }
    // Numeric-kind values promote through each other (and through a String
    // operand, coercing it) ahead of falling back to a byte string compare,
    // matching the rank order `numeric_rank` documents: Number > Float >
    // Int/Bool > String > Date.
    if is_numericish(a) && (is_numericish(b) || matches!(b, Value::String(_))) {
        return numeric_compare(a, b);
    }
    if is_numericish(b) && matches!(a, Value::String(_)) {
        return numeric_compare(a, b);
    }
    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
        return string_compare(a, b);
    }
    numeric_compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_equality_scenarios() {
        assert!(compare_soft(&Value::Int(1), &Value::string("1")));
        assert!(compare_soft(&Value::Int(1), &Value::string("1.0")));
        assert!(compare_soft(&Value::string("1"), &Value::Bool(true)));
    }

    #[test]
    fn hard_equality_rejects_cross_type() {
        assert!(!compare_hard(&Value::Int(1), &Value::string("1")));
        assert!(!compare_hard(&Value::Int(1), &Value::string("1.0")));
        assert!(!compare_hard(&Value::string("1"), &Value::Bool(true)));
    }
}
