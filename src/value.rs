//! Dynamic value representation for DeX data.
//!
//! This module provides the [`Value`] enum which represents any value a DeX
//! document can hold. After parsing there are exactly four shapes: strings,
//! 64-bit floats (the sole numeric representation), booleans and nested
//! [`Table`]s. There is no null; absence is modeled by key absence.
//!
//! ## Creating Values
//!
//! ```rust
//! use dex::Value;
//!
//! let text = Value::from("hello");
//! let number = Value::from(42);
//! let flag = Value::from(true);
//!
//! assert!(text.is_str());
//! assert_eq!(number.as_f64(), Some(42.0));
//! ```
//!
//! ## Extracting Values
//!
//! The `as_*` accessors return `Option`; the `TryFrom` conversions return a
//! [`CoerceError`] naming the attempted coercion. Integer extraction refuses
//! to drop fractional data:
//!
//! ```rust
//! use dex::{CoerceError, Value};
//!
//! let n = Value::from(42.5);
//! assert_eq!(i64::try_from(&n), Err(CoerceError::FractionalLoss(42.5)));
//! ```

use crate::error::CoerceError;
use crate::table::Table;
use serde::{Serialize, Serializer};
use std::fmt;

/// A dynamically-typed DeX value: string, number, boolean or table.
///
/// Numbers are always `f64` — the parser coerces every numeric literal to a
/// 64-bit float, so `1` and `1.0` are the same value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Table(Table),
}

impl Value {
    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Returns `true` if the value is a number.
    #[inline]
    #[must_use]
    pub const fn is_num(&self) -> bool {
        matches!(self, Value::Num(_))
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is a table.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// If the value is a string, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a number, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a whole number that fits `i64`, returns it.
    ///
    /// ```rust
    /// use dex::Value;
    ///
    /// assert_eq!(Value::from(42.0).as_i64(), Some(42));
    /// assert_eq!(Value::from(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Num(n) if n.fract() == 0.0 && in_i64_range(*n) => Some(*n as i64),
            _ => None,
        }
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a table, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Human-readable name of the value's type, used in coercion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Table(_) => "table",
        }
    }
}

fn in_i64_range(n: f64) -> bool {
    // 2^63 is exactly representable as f64; i64::MAX itself is not.
    n >= -(2f64.powi(63)) && n < 2f64.powi(63)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Num(n) => f.write_str(&crate::ser::format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Table(t) => write!(f, "{}", t),
        }
    }
}

impl TryFrom<&Value> for i64 {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::Num(n) if n.fract() != 0.0 => Err(CoerceError::FractionalLoss(*n)),
            Value::Num(n) if !in_i64_range(*n) => Err(CoerceError::OutOfRange {
                value: *n,
                target: "i64",
            }),
            Value::Num(n) => Ok(*n as i64),
            other => Err(CoerceError::Mismatch {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, CoerceError> {
        value.as_f64().ok_or(CoerceError::Mismatch {
            expected: "number",
            found: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for bool {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, CoerceError> {
        value.as_bool().ok_or(CoerceError::Mismatch {
            expected: "boolean",
            found: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for String {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(CoerceError::Mismatch {
                expected: "string",
                found: other.type_name(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Num(value as f64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Num(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(value as f64)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Num(value as f64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Num(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Num(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Table(t) => t.serialize(serializer),
        }
    }
}
