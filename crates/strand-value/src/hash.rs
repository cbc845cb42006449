//! `Hash`: the insertion-ordered, string-keyed map (§4.2.1/C2).

use indexmap::IndexMap;

use crate::encoding::Encoding;
use crate::equality::{compare_hard, compare_soft};
use crate::value::Value;

/// Policy for `merge` when a key exists in both maps (§4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The incoming map's value wins (the only policy the spec names).
    Overwrite,
}

/// Insertion-ordered, string-keyed map.
///
/// Keys are stored already normalized to the canonical encoding (§3
/// invariant 2); re-assigning an existing key does not change its position
/// because `IndexMap::insert` on an existing key updates the value in
/// place without touching its slot.
#[derive(Debug, Clone, Default)]
pub struct QHash {
    entries: IndexMap<String, Value>,
    /// Marks parse-time hashes whose values still contain un-evaluated
    /// expressions (§3).
    pub needs_eval: bool,
}

impl QHash {
    pub fn new() -> Self {
        QHash { entries: IndexMap::new(), needs_eval: false }
    }

    fn normalize_key(key: &str) -> String {
        // The canonical encoding is UTF-8; Rust `str` already guarantees
        // that, so normalization here is the identity transform, but the
        // function exists as the single seam a future non-UTF-8 key path
        // would need to go through (§3 invariant 2, §4.1 encodings).
        let _ = Encoding::CANONICAL;
        key.to_string()
    }

    /// Never fails; absent keys read as `None` (the "missing sentinel").
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Moves `value` in; if the key already existed, the previous value is
    /// dropped (released) here and the key keeps its original position.
    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(Self::normalize_key(key), value);
    }

    /// Mutable access to an existing key, or `None` — used by the lvalue
    /// helper to navigate into `h.key` without cloning the value out first.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Mutable access to a key, inserting `Nothing` if absent (an lvalue
    /// reference to an unset hash key is always writable; §4.3).
    pub fn get_or_insert_mut(&mut self, key: &str) -> &mut Value {
        self.entries.entry(Self::normalize_key(key)).or_insert(Value::Nothing)
    }

    /// Releases the entry's value and removes it.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Like `delete` but returns the value, transferring ownership.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// For each entry in `other`, overwrite (or insert) the entry in
    /// `self`, releasing any old value (§4.2.1).
    pub fn merge(&mut self, other: &QHash, _policy: DuplicatePolicy) {
        for (k, v) in other.iter() {
            self.set(k, v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn compare_soft(&self, other: &QHash) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).map(|ov| compare_soft(v, ov)).unwrap_or(false))
    }

    pub fn compare_hard(&self, other: &QHash) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.entries
            .iter()
            .zip(other.entries.iter())
            .all(|((k1, v1), (k2, v2))| k1 == k2 && compare_hard(v1, v2))
    }
}

impl PartialEq for QHash {
    fn eq(&self, other: &Self) -> bool {
        self.compare_hard(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved_across_overwrite() {
        let mut h = QHash::new();
        h.set("a", Value::Int(1));
        h.set("b", Value::Int(2));
        h.set("a", Value::Int(3));
        let collected: Vec<(&str, i64)> = h
            .iter()
            .map(|(k, v)| (k.as_str(), if let Value::Int(i) = v { *i } else { 0 }))
            .collect();
        assert_eq!(collected, vec![("a", 3), ("b", 2)]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn take_then_set_equals_set() {
        let mut h1 = QHash::new();
        h1.set("k", Value::Int(1));
        h1.take("k");
        h1.set("k", Value::Int(9));

        let mut h2 = QHash::new();
        h2.set("k", Value::Int(1));
        h2.set("k", Value::Int(9));

        assert!(h1.compare_hard(&h2));
    }
}
