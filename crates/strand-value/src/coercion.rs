//! Per-variant coercion: `as_bool`, `as_int`, `as_float`, `as_number`,
//! `as_string`, `as_date` (§4.1).

use crate::date::QDate;
use crate::number::QNumber;
use crate::string::QString;
use crate::value::Value;

/// Parse a leading base-10 integer, stopping at the first non-digit; yields
/// `0` if nothing parses (§4.1).
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let mut end = 0;
    let bytes = s.as_bytes();
    let mut idx = 0;
    if idx < bytes.len() && (bytes[idx] == b'-' || bytes[idx] == b'+') {
        idx += 1;
    }
    let start_digits = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start_digits {
        return 0;
    }
    end = idx;
    s[..end].parse().unwrap_or(0)
}

fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut idx = 0;
    if idx < bytes.len() && (bytes[idx] == b'-' || bytes[idx] == b'+') {
        idx += 1;
    }
    let mut seen_digit = false;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
        seen_digit = true;
    }
    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return 0.0;
    }
    s[..idx].parse().unwrap_or(0.0)
}

impl Value {
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Nothing | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Binary(b) => !b.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Hash(h) => !h.is_empty(),
            Value::Date(_) => true,
            Value::Object(_)
            | Value::CallReference(_)
            | Value::Reference(_)
            | Value::Regex(_)
            | Value::RegexSubst(_)
            | Value::Transliteration(_) => true,
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Nothing | Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(i) => *i,
            Value::Float(f) => *f as i64,
            Value::Number(n) => n.to_i64(),
            Value::String(s) => leading_int(&s.as_str()),
            Value::List(l) => l.len() as i64,
            Value::Hash(h) => h.len() as i64,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Value::Nothing | Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Number(n) => n.to_f64(),
            Value::String(s) => leading_float(&s.as_str()),
            _ => 0.0,
        }
    }

    pub fn as_number(&self) -> QNumber {
        match self {
            Value::Number(n) => n.clone(),
            Value::Int(i) => QNumber::from_i64(*i),
            Value::Float(f) => QNumber::from_f64(*f),
            Value::String(s) => QNumber::parse(&s.as_str()).unwrap_or_else(|| QNumber::from_i64(0)),
            Value::Bool(b) => QNumber::from_i64(*b as i64),
            _ => QNumber::from_i64(0),
        }
    }

    pub fn as_string(&self) -> QString {
        match self {
            Value::String(s) => s.clone(),
            other => QString::from_utf8(other.to_display_string()),
        }
    }

    pub fn as_date(&self) -> QDate {
        match self {
            Value::Date(d) => (**d).clone(),
            Value::Int(i) => QDate::Relative(crate::date::RelativeDate {
                seconds: *i as i32,
                ..Default::default()
            }),
            _ => QDate::Relative(crate::date::RelativeDate::zero()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_int_stops_at_first_non_digit() {
        assert_eq!(Value::string("42abc").as_int(), 42);
        assert_eq!(Value::string("abc").as_int(), 0);
    }

    #[test]
    fn empty_collections_are_falsy() {
        assert!(!Value::list(vec![]).as_bool());
        assert!(Value::list(vec![Value::Int(1)]).as_bool());
    }
}
