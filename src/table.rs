//! The immutable table at the heart of the DeX data model.
//!
//! A [`Table`] is an insertion-ordered collection of unique `(key, value)`
//! entries, optionally carrying a type tag. The same storage serves both as
//! an ordered map and as a positional array: [`Table::is_array`] reports
//! whether the keys are exactly `0 .. len-1` in order, and
//! [`Table::values`] exposes the positional [`ArrayView`] projection.
//!
//! Tables are immutable once created. All construction goes through the
//! one-shot [`Builder`]; "modifying" a table means cloning it into a new
//! builder with [`Table::to_builder`] and creating a fresh table.
//!
//! ## Examples
//!
//! ```rust
//! use dex::Table;
//!
//! let table = Table::builder()
//!     .put("name", "Miku")
//!     .put("age", 16)
//!     .create();
//!
//! assert!(!table.is_array());
//! assert_eq!(table.get_str("name").unwrap(), "Miku");
//! assert_eq!(table.get_i64("age").unwrap(), 16);
//!
//! let list = Table::builder().add(1).add(2).add(3).create();
//! assert!(list.is_array());
//! assert_eq!(list.values().get_f64(2).unwrap(), 3.0);
//! ```

use crate::array::ArrayView;
use crate::error::CoerceError;
use crate::map::{DexMap, Key};
use crate::value::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// An immutable, insertion-ordered collection of unique `(key, value)`
/// entries with an optional type tag.
#[derive(Clone, Debug)]
pub struct Table {
    tag: String,
    entries: DexMap,
    is_array: bool,
}

/// The empty untagged table, which is a zero-length array.
impl Default for Table {
    fn default() -> Self {
        Table::from_map(String::new(), DexMap::default())
    }
}

impl Table {
    /// Starts a builder for an untagged table.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new(String::new(), 0)
    }

    /// Starts a builder for a table tagged `tag`.
    #[must_use]
    pub fn builder_tagged(tag: impl Into<String>) -> Builder {
        Builder::new(tag.into(), 0)
    }

    /// Starts a builder with a capacity hint for the entry storage.
    #[must_use]
    pub fn builder_with_capacity(tag: impl Into<String>, capacity: usize) -> Builder {
        Builder::new(tag.into(), capacity)
    }

    /// Starts a new builder preloaded with this table's tag and entries —
    /// the copy-on-write path for "modify and re-create".
    #[must_use]
    pub fn to_builder(&self) -> Builder {
        let mut builder = Builder::new(self.tag.clone(), self.len());
        for (key, value) in self.entries.iter() {
            builder.entries.insert(key.clone(), value.clone());
        }
        builder
    }

    pub(crate) fn from_map(tag: String, entries: DexMap) -> Self {
        let is_array = compute_is_array(&entries);
        Table {
            tag,
            entries,
            is_array,
        }
    }

    /// Clone of this table with the tag removed; used when a tag is consumed
    /// as an entry key.
    pub(crate) fn strip_tag(mut self) -> Self {
        self.tag.clear();
        self
    }

    pub(crate) fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    /// The type tag; empty means untagged.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns `true` if the table carries a non-empty tag.
    #[inline]
    #[must_use]
    pub fn has_tag(&self) -> bool {
        !self.tag.is_empty()
    }

    /// Returns `true` if the entry keys are exactly the integers
    /// `0 .. len-1`, each once, in that order.
    ///
    /// The flag is computed from the final entry set when the table is
    /// created, never tracked incrementally — entries can arrive in any
    /// order during parsing and a late explicit key can turn an apparent
    /// array into a map.
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Looks up a value by key. Numeric keys are normalized, so `1`, `1.0`
    /// and `1u32 as f64` address the same entry.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.entries.get(&key.into())
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn has_key(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_some()
    }

    /// The entry at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&Value, &Value)> {
        self.entries
            .get_index(index)
            .map(|(k, v)| (k.as_value(), v))
    }

    /// The string at `key`; fails if absent or not a string.
    pub fn get_str(&self, key: impl Into<Key>) -> Result<&str, CoerceError> {
        let value = self.require(key)?;
        value.as_str().ok_or(CoerceError::Mismatch {
            expected: "string",
            found: value.type_name(),
        })
    }

    /// The number at `key`; fails if absent or not a number.
    pub fn get_f64(&self, key: impl Into<Key>) -> Result<f64, CoerceError> {
        f64::try_from(self.require(key)?)
    }

    /// The number at `key` narrowed to `i64`; fails if absent, not a number,
    /// or carrying fractional data that narrowing would drop.
    pub fn get_i64(&self, key: impl Into<Key>) -> Result<i64, CoerceError> {
        i64::try_from(self.require(key)?)
    }

    /// The boolean at `key`; fails if absent or not a boolean.
    pub fn get_bool(&self, key: impl Into<Key>) -> Result<bool, CoerceError> {
        bool::try_from(self.require(key)?)
    }

    /// The table at `key`; fails if absent or not a table.
    pub fn get_table(&self, key: impl Into<Key>) -> Result<&Table, CoerceError> {
        let value = self.require(key)?;
        value.as_table().ok_or(CoerceError::Mismatch {
            expected: "table",
            found: value.type_name(),
        })
    }

    fn require(&self, key: impl Into<Key>) -> Result<&Value, CoerceError> {
        let key = key.into();
        self.entries
            .get(&key)
            .ok_or_else(|| CoerceError::Missing(key.render()))
    }

    /// The positional projection of this table's values.
    ///
    /// The view borrows the table; since tables are immutable it can never
    /// go stale.
    #[must_use]
    pub fn values(&self) -> ArrayView<'_> {
        ArrayView::new(self)
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_value(), v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k.as_value())
    }

    /// The first table-valued entry whose tag is `tag`.
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Option<&Table> {
        self.iter()
            .filter_map(|(_, v)| v.as_table())
            .find(|t| t.tag() == tag)
    }

    /// Every table-valued entry whose tag is `tag`, in insertion order.
    #[must_use]
    pub fn all_by_tag(&self, tag: &str) -> Vec<&Table> {
        self.iter()
            .filter_map(|(_, v)| v.as_table())
            .filter(|t| t.tag() == tag)
            .collect()
    }
}

fn compute_is_array(entries: &DexMap) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, (k, _))| matches!(k.as_value(), Value::Num(n) if *n == i as f64))
}

/// Equality is tag equality plus pairwise entry equality in insertion order,
/// with numeric keys compared by normalized value.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.len() == other.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::to_string_pretty(self))
    }
}

/// Tables serialize as serde sequences when they are arrays and as maps
/// otherwise. Non-string map keys serialize as their canonical DeX token so
/// that string-keyed backends like JSON can represent them.
impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_array {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for value in self.values() {
                seq.serialize_element(value)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.entries.iter() {
                map.serialize_entry(&key.render(), value)?;
            }
            map.end()
        }
    }
}

/// One-shot staging object producing an immutable [`Table`].
///
/// `create` consumes the builder and transfers the staged storage into the
/// result, so post-publish mutation is a compile error rather than a runtime
/// check.
///
/// A duplicate key replaces the previous value at its original position;
/// parse-time duplicate *detection* is the parser's job, not the builder's.
#[derive(Debug)]
pub struct Builder {
    tag: String,
    entries: DexMap,
    auto_index: usize,
}

impl Builder {
    fn new(tag: String, capacity: usize) -> Self {
        Builder {
            tag,
            entries: DexMap::with_capacity(capacity),
            auto_index: 0,
        }
    }

    /// Stages an explicit `(key, value)` entry.
    #[must_use]
    pub fn put(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Stages a value under the next auto-incremented integer index.
    ///
    /// Auto indices count only `add` calls, so interleaved `put`s do not
    /// shift them.
    #[must_use]
    pub fn add(mut self, value: impl Into<Value>) -> Self {
        let key = Key::from(self.auto_index);
        self.auto_index += 1;
        self.entries.insert(key, value.into());
        self
    }

    /// Stages every value of an iterator under auto indices.
    #[must_use]
    pub fn add_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self = self.add(value);
        }
        self
    }

    /// Finalizes the staged entries into an immutable [`Table`].
    #[must_use]
    pub fn create(self) -> Table {
        Table::from_map(self.tag, self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_flag_recomputed_from_final_keys() {
        let t = Table::builder().add("a").add("b").create();
        assert!(t.is_array());

        // An explicit key among auto indices demotes the table to a map,
        // but the auto entries keep their original integer keys.
        let t = Table::builder().add("a").put("x", 1).add("b").create();
        assert!(!t.is_array());
        assert_eq!(t.get_str(0).unwrap(), "a");
        assert_eq!(t.get_str(1).unwrap(), "b");

        // Explicit integer keys forming 0..n-1 still count as an array.
        let t = Table::builder().put(1, "b").put(0, "a").create();
        assert!(!t.is_array()); // order 1, 0 is not positional
        let t = Table::builder().put(0, "a").put(1.0, "b").create();
        assert!(t.is_array());
    }

    #[test]
    fn empty_table_is_array() {
        assert!(Table::builder().create().is_array());
    }

    #[test]
    fn normalized_key_lookup() {
        let t = Table::builder().put(1, "one").create();
        assert_eq!(t.get_str(1.0).unwrap(), "one");
        assert!(t.get("1").is_none());
        assert!(t.has_key(1));
        assert!(!t.has_key("1"));
    }

    #[test]
    fn key_iteration_order() {
        let t = Table::builder().put("b", 1).put("a", 2).create();
        let keys: Vec<_> = t.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn typed_accessors_fail_loudly() {
        let t = Table::builder()
            .put("s", "text")
            .put("n", 1.5)
            .put("b", true)
            .create();
        assert_eq!(
            t.get_f64("s"),
            Err(CoerceError::Mismatch {
                expected: "number",
                found: "string"
            })
        );
        assert_eq!(t.get_i64("n"), Err(CoerceError::FractionalLoss(1.5)));
        assert_eq!(t.get_bool("b"), Ok(true));
        assert_eq!(t.get_str("missing"), Err(CoerceError::Missing("missing".into())));
    }

    #[test]
    fn to_builder_round_trips_and_extends() {
        let t = Table::builder_tagged("vec").put("x", 1).put("y", 2).create();
        let t2 = t.to_builder().put("z", 3).create();
        assert_eq!(t2.tag(), "vec");
        assert_eq!(t2.len(), 3);
        assert_eq!(t2.get_i64("x").unwrap(), 1);
        // The source table is untouched.
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn by_tag_scans_values() {
        let inner = Table::builder_tagged("vocaloid").put("age", 15).create();
        let other = Table::builder_tagged("utau").create();
        let t = Table::builder().add(inner.clone()).add(other).create();
        assert_eq!(t.by_tag("vocaloid"), Some(&inner));
        assert!(t.by_tag("nope").is_none());
        assert_eq!(t.all_by_tag("utau").len(), 1);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = Table::builder().put("a", 1).put("b", 2).create();
        let b = Table::builder().put("b", 2).put("a", 1).create();
        assert_ne!(a, b);
        let c = Table::builder().put("a", 1).put("b", 2).create();
        assert_eq!(a, c);
    }

    #[test]
    fn table_as_key() {
        let key = Table::builder().add(1).add(2).create();
        let t = Table::builder().put(Value::from(key.clone()), "v").create();
        assert_eq!(t.get_str(Value::from(key)).unwrap(), "v");
    }
}
