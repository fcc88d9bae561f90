//! Ordered entry storage and key normalization for tables.
//!
//! DeX tables preserve insertion order and that order is externally
//! observable (iteration, printing), so the storage is an
//! [`IndexMap`] rather than a hash map.
//!
//! Keys are [`Value`]s with normalized equality:
//!
//! - numeric keys compare by value, so `1` and `1.0` collide;
//! - `-0.0` and `0.0` are the same key, and a `NaN` key equals itself;
//! - numeric and string keys never collide: `1` and `"1"` are distinct.
//!
//! ```rust
//! use dex::Key;
//!
//! assert_eq!(Key::from(1), Key::from(1.0));
//! assert_ne!(Key::from(1), Key::from("1"));
//! ```

use crate::value::Value;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// A table key: any [`Value`] with normalized equality and hashing.
#[derive(Clone, Debug)]
pub struct Key(Value);

impl Key {
    /// The underlying value.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the key, returning the underlying value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The key rendered as its canonical source token, used in duplicate-key
    /// diagnostics.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.0 {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        key_eq(&self.0, &other.0)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

fn key_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x == y,
        // NaN keys must equal themselves or they could never be found again.
        (Value::Num(x), Value::Num(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Table(x), Value::Table(y)) => {
            x.tag() == y.tag()
                && x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((k1, v1), (k2, v2))| key_eq(k1, k2) && key_eq(v1, v2))
        }
        _ => false,
    }
}

fn hash_value<H: Hasher>(v: &Value, state: &mut H) {
    match v {
        Value::Str(s) => {
            0u8.hash(state);
            s.hash(state);
        }
        Value::Num(n) => {
            1u8.hash(state);
            normalize_bits(*n).hash(state);
        }
        Value::Bool(b) => {
            2u8.hash(state);
            b.hash(state);
        }
        Value::Table(t) => {
            3u8.hash(state);
            t.tag().hash(state);
            t.len().hash(state);
            for (k, val) in t.iter() {
                hash_value(k, state);
                hash_value(val, state);
            }
        }
    }
}

/// Collapses `-0.0` into `0.0` and every NaN into one canonical NaN so that
/// hashing agrees with [`key_eq`].
fn normalize_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(Value::Str(value.to_string()))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(Value::Str(value))
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Key(Value::Num(value))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key(Value::Num(value as f64))
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key(Value::Num(value as f64))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key(Value::Num(value as f64))
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key(Value::Bool(value))
    }
}

/// Insertion-ordered `Key -> Value` storage backing [`Table`](crate::Table).
#[derive(Clone, Debug, Default)]
pub(crate) struct DexMap(IndexMap<Key, Value>);

impl DexMap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        DexMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a pair; a duplicate key replaces the old value in place and
    /// returns it.
    pub(crate) fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Value> {
        self.0.get(key)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<(&Key, &Value)> {
        self.0.get_index(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.0.iter()
    }
}
