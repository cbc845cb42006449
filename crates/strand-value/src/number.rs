//! Arbitrary-precision `Number`, which wins numeric promotion against
//! `Float` and `Int` (§4.1).

use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};

/// Reference-counted arbitrary-precision decimal.
///
/// Wrapped in `Arc` so that cloning a `Value::Number` is the cheap pointer
/// copy the rest of the core assumes for "counted" values (§3 invariant 1);
/// the `BigDecimal` payload itself is only duplicated when a caller
/// explicitly needs an owned mutable copy.
#[derive(Debug, Clone)]
pub struct QNumber(Arc<BigDecimal>);

impl QNumber {
    pub fn from_i64(v: i64) -> Self {
        QNumber(Arc::new(BigDecimal::from(v)))
    }

    pub fn from_f64(v: f64) -> Self {
        QNumber(Arc::new(BigDecimal::try_from(v).unwrap_or_else(|_| BigDecimal::zero())))
    }

    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<BigDecimal>().ok().map(|b| QNumber(Arc::new(b)))
    }

    pub fn as_bigdecimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_i64(&self) -> i64 {
        self.0.to_i64().unwrap_or(0)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn add(&self, other: &QNumber) -> QNumber {
        QNumber(Arc::new(&*self.0 + &*other.0))
    }

    pub fn sub(&self, other: &QNumber) -> QNumber {
        QNumber(Arc::new(&*self.0 - &*other.0))
    }

    pub fn mul(&self, other: &QNumber) -> QNumber {
        QNumber(Arc::new(&*self.0 * &*other.0))
    }

    /// Division by zero is the caller's responsibility to guard against and
    /// raise `DIVISION-BY-ZERO` for (§7); this returns `None` in that case.
    pub fn div(&self, other: &QNumber) -> Option<QNumber> {
        if other.is_zero() {
            return None;
        }
        Some(QNumber(Arc::new(&*self.0 / &*other.0)))
    }

    pub fn cmp(&self, other: &QNumber) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialEq for QNumber {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl fmt::Display for QNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
