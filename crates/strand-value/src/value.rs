//! The tagged `Value` sum type (§3/C1): a small inline primitive or an
//! `Arc`-shared heap cell, giving every variant the uniform, cheap
//! pass-by-value clone semantics the rest of the core assumes for a
//! "counted" value (§3 invariant 1). `Nothing`/`Null`/`Bool` are the
//! explicit singletons the spec calls out; everything else is `Clone`-cheap
//! through `Arc` rather than hand-rolled refcounting, since that is what
//! "increments a reference count on creation, decrements on destruction"
//! means once expressed against Rust's ownership model.

use std::fmt;
use std::sync::Arc;

use crate::callable::Callable;
use crate::date::QDate;
use crate::encoding::Encoding;
use crate::hash::QHash;
use crate::list::QList;
use crate::number::QNumber;
use crate::object::QObject;
use crate::pattern::{CompiledRegex, CompiledSubst, Transliteration};
use crate::reference_target::ReferenceTarget;
use crate::string::QString;

#[derive(Clone)]
pub enum Value {
    Nothing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Number(QNumber),
    String(QString),
    Binary(Arc<Vec<u8>>),
    Date(Arc<QDate>),
    List(Arc<QList>),
    Hash(Arc<QHash>),
    Object(Arc<QObject>),
    CallReference(Arc<dyn Callable>),
    Reference(Arc<dyn ReferenceTarget>),
    Regex(Arc<CompiledRegex>),
    RegexSubst(Arc<CompiledSubst>),
    Transliteration(Arc<Transliteration>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(QString::from_utf8(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Arc::new(QList::from_vec(items)))
    }

    pub fn hash(h: QHash) -> Value {
        Value::Hash(Arc::new(h))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Object(_) => "object",
            Value::CallReference(_) => "callref",
            Value::Reference(_) => "reference",
            Value::Regex(_) => "regex",
            Value::RegexSubst(_) => "regex-subst",
            Value::Transliteration(_) => "transliteration",
        }
    }

    /// Used by diagnostics and the top-level uncaught-exception printer
    /// (§7: "arg ... is pretty-printed beneath").
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Nothing => "NOTHING".to_string(),
            Value::Null => "<NULL>".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{}", f),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.as_str().into_owned(),
            Value::Binary(b) => format!("<binary: {} bytes>", b.len()),
            Value::Date(d) => d.to_string(),
            Value::List(l) => {
                let parts: Vec<String> = l.iter().map(|v| v.to_display_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Hash(h) => {
                let parts: Vec<String> =
                    h.iter().map(|(k, v)| format!("{}: {}", k, v.to_display_string())).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Object(o) => format!("<object of class {}>", o.class_id),
            Value::CallReference(c) => format!("<callref {}>", c.name()),
            Value::Reference(_) => "<reference>".to_string(),
            Value::Regex(r) => format!("<regex /{}/>", r.source),
            Value::RegexSubst(r) => format!("<regex-subst /{}/>", r.regex.source),
            Value::Transliteration(_) => "<transliteration>".to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({}: {})", self.type_name(), self.to_display_string())
    }
}

// Manual PartialEq delegates to *hard* equality (§4.1) so `assert_eq!` in
// tests reads naturally; soft equality is always explicit via
// `equality::compare_soft`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::compare_hard(self, other)
    }
}

pub(crate) fn encoding_of(v: &Value) -> Encoding {
    match v {
        Value::String(s) => s.encoding(),
        _ => Encoding::CANONICAL,
    }
}
