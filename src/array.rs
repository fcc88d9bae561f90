//! Positional array view over a table.
//!
//! An [`ArrayView`] is a read-only, order-preserving projection of a
//! [`Table`]'s values for integer-indexed access. It borrows the table —
//! nothing is copied — and since tables are immutable the view can never go
//! stale.
//!
//! ```rust
//! let doc = dex::from_str("{10, 20, 30}").unwrap();
//! let list = doc.values().get_table(0).unwrap().values();
//!
//! assert_eq!(list.len(), 3);
//! assert_eq!(list.get_f64(1).unwrap(), 20.0);
//! ```

use crate::error::CoerceError;
use crate::table::Table;
use crate::value::Value;

/// Read-only positional projection of a [`Table`]'s values.
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a> {
    table: &'a Table,
}

impl<'a> ArrayView<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        ArrayView { table }
    }

    /// The value at `index` in insertion order, regardless of its key.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.table.get_index(index).map(|(_, v)| v)
    }

    /// The number of values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the underlying table has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The underlying table's tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &'a str {
        self.table.tag()
    }

    /// The table this view projects; no conversion cost.
    #[inline]
    #[must_use]
    pub fn to_table(&self) -> &'a Table {
        self.table
    }

    /// The string at `index`; fails if absent or not a string.
    pub fn get_str(&self, index: usize) -> Result<&'a str, CoerceError> {
        let value = self.require(index)?;
        value.as_str().ok_or(CoerceError::Mismatch {
            expected: "string",
            found: value.type_name(),
        })
    }

    /// The number at `index`; fails if absent or not a number.
    pub fn get_f64(&self, index: usize) -> Result<f64, CoerceError> {
        f64::try_from(self.require(index)?)
    }

    /// The number at `index` narrowed to `i64`; fails on fractional loss.
    pub fn get_i64(&self, index: usize) -> Result<i64, CoerceError> {
        i64::try_from(self.require(index)?)
    }

    /// The boolean at `index`; fails if absent or not a boolean.
    pub fn get_bool(&self, index: usize) -> Result<bool, CoerceError> {
        bool::try_from(self.require(index)?)
    }

    /// The table at `index`; fails if absent or not a table.
    pub fn get_table(&self, index: usize) -> Result<&'a Table, CoerceError> {
        let value = self.require(index)?;
        value.as_table().ok_or(CoerceError::Mismatch {
            expected: "table",
            found: value.type_name(),
        })
    }

    fn require(&self, index: usize) -> Result<&'a Value, CoerceError> {
        self.get(index)
            .ok_or_else(|| CoerceError::Missing(index.to_string()))
    }

    /// Iterates the values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl<'a> IntoIterator for ArrayView<'a> {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            view: self,
            index: 0,
        }
    }
}

/// Owned iterator over an [`ArrayView`].
#[derive(Debug)]
pub struct Iter<'a> {
    view: ArrayView<'a>,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.view.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
