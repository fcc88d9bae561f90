//! Tag ⇄ native-type mapping.
//!
//! A [`Serialization`] registry maps tag strings to converters and native
//! types back to tags. It is an explicit instance threaded through every
//! [`decompose`](Serialization::decompose) and
//! [`compose`](Serialization::compose) call — independent parse sessions
//! cannot leak or collide on registrations, and nothing global exists.
//!
//! Types opt in by implementing [`DexSerialize`]: `decompose` turns a value
//! into a [`Value`] (usually a table, one entry per field) and `compose`
//! rebuilds the value from one. Registering a tag for the type makes
//! decomposed tables carry that tag, and lets a parsed table be dispatched
//! dynamically through [`Serialization::compose_tagged`].
//!
//! The registry is read-mostly: registration takes `&mut self`, lookups take
//! `&self`. Callers that register at runtime while sharing the registry
//! across threads should wrap it in a lock.
//!
//! ```rust
//! use dex::{ComposeError, DexSerialize, Serialization, Table, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point { x: f64, y: f64 }
//!
//! impl DexSerialize for Point {
//!     fn decompose(&self, sel: &Serialization) -> Value {
//!         Table::builder()
//!             .put("x", sel.decompose(&self.x))
//!             .put("y", sel.decompose(&self.y))
//!             .create()
//!             .into()
//!     }
//!
//!     fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
//!         let table = Serialization::as_table(value)?;
//!         Ok(Point {
//!             x: sel.compose(table.field("x")?)?,
//!             y: sel.compose(table.field("y")?)?,
//!         })
//!     }
//! }
//!
//! let mut sel = Serialization::new();
//! sel.register_tag::<Point>("point");
//!
//! let value = sel.decompose(&Point { x: 1.0, y: 2.0 });
//! let printed = dex::to_string(value.as_table().unwrap());
//! assert_eq!(printed, r#"point{"x":1,"y":2}"#);
//! ```

use crate::error::CoerceError;
use crate::table::Table;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Failure composing a native value from a table, or decomposing one into a
/// table. Surfaced to the caller, never swallowed.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Tag dispatch was requested on an untagged table.
    #[error("table is untagged, cannot dispatch by tag")]
    MissingTag,
    /// No converter is registered for the table's tag.
    #[error("no converter registered for tag `{0}`")]
    UnknownTag(String),
    /// A field the target type requires is absent from the table.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A stored value could not be coerced to the field's type.
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    /// Converter-specific failure.
    #[error("{0}")]
    Custom(String),
}

/// Conversion between a native type and the DeX value model.
///
/// `decompose` and `compose` both receive the registry so nested fields can
/// recurse through it and pick up their own registered tags.
pub trait DexSerialize: Sized {
    fn decompose(&self, sel: &Serialization) -> Value;
    fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError>;
}

type DynDecompose = Box<dyn Fn(&dyn Any, &Serialization) -> Option<Value>>;
type DynCompose = Box<dyn Fn(&Value, &Serialization) -> Result<Box<dyn Any>, ComposeError>>;

struct Converter {
    decompose: DynDecompose,
    compose: DynCompose,
}

/// The converter registry, keyed by tag string and by native type identity.
#[derive(Default)]
pub struct Serialization {
    by_tag: HashMap<String, Converter>,
    by_type: HashMap<TypeId, Converter>,
    tag_by_type: HashMap<TypeId, String>,
}

impl Serialization {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `tag`. Tables decomposed from `T` carry the tag,
    /// and parsed tables carrying it can be composed dynamically with
    /// [`compose_tagged`](Self::compose_tagged).
    pub fn register_tag<T: DexSerialize + 'static>(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        self.tag_by_type.insert(TypeId::of::<T>(), tag.clone());
        self.by_tag.insert(tag, Self::converter::<T>());
        self.by_type.insert(TypeId::of::<T>(), Self::converter::<T>());
    }

    fn converter<T: DexSerialize + 'static>() -> Converter {
        Converter {
            decompose: Box::new(|any, sel| {
                any.downcast_ref::<T>().map(|value| sel.decompose(value))
            }),
            compose: Box::new(|value, sel| {
                T::compose(value, sel).map(|value| Box::new(value) as Box<dyn Any>)
            }),
        }
    }

    /// The tag registered for `T`, if any.
    #[must_use]
    pub fn tag_for<T: 'static>(&self) -> Option<&str> {
        self.tag_by_type
            .get(&TypeId::of::<T>())
            .map(String::as_str)
    }

    /// Decomposes a native value, attaching the tag registered for its type
    /// when the result is an untagged table.
    pub fn decompose<T: DexSerialize + 'static>(&self, value: &T) -> Value {
        match (value.decompose(self), self.tag_for::<T>()) {
            (Value::Table(t), Some(tag)) if !t.has_tag() => Value::Table(t.with_tag(tag)),
            (decomposed, _) => decomposed,
        }
    }

    /// Decomposes a type-erased value through its registered converter.
    #[must_use]
    pub fn decompose_dyn(&self, value: &dyn Any) -> Option<Value> {
        let converter = self.by_type.get(&value.type_id())?;
        (converter.decompose)(value, self)
    }

    /// Composes `T` from a value.
    pub fn compose<T: DexSerialize>(&self, value: &Value) -> Result<T, ComposeError> {
        T::compose(value, self)
    }

    /// Composes a native value from a tagged table, dispatching on the tag.
    pub fn compose_tagged(&self, table: &Table) -> Result<Box<dyn Any>, ComposeError> {
        if !table.has_tag() {
            return Err(ComposeError::MissingTag);
        }
        let converter = self
            .by_tag
            .get(table.tag())
            .ok_or_else(|| ComposeError::UnknownTag(table.tag().to_string()))?;
        (converter.compose)(&Value::Table(table.clone()), self)
    }

    /// Converter helper: the value as a table, or a coercion error.
    pub fn as_table(value: &Value) -> Result<&Table, ComposeError> {
        value.as_table().ok_or(ComposeError::Coerce(CoerceError::Mismatch {
            expected: "table",
            found: value.type_name(),
        }))
    }
}

impl Table {
    /// Converter helper: the value at `key`, or
    /// [`ComposeError::MissingField`].
    pub fn field(&self, key: &str) -> Result<&Value, ComposeError> {
        self.get(key)
            .ok_or_else(|| ComposeError::MissingField(key.to_string()))
    }
}

impl DexSerialize for Value {
    fn decompose(&self, _sel: &Serialization) -> Value {
        self.clone()
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(value.clone())
    }
}

impl DexSerialize for Table {
    fn decompose(&self, _sel: &Serialization) -> Value {
        Value::Table(self.clone())
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(Serialization::as_table(value)?.clone())
    }
}

impl DexSerialize for bool {
    fn decompose(&self, _sel: &Serialization) -> Value {
        Value::Bool(*self)
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(bool::try_from(value)?)
    }
}

impl DexSerialize for String {
    fn decompose(&self, _sel: &Serialization) -> Value {
        Value::Str(self.clone())
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(String::try_from(value)?)
    }
}

impl DexSerialize for f64 {
    fn decompose(&self, _sel: &Serialization) -> Value {
        Value::Num(*self)
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(f64::try_from(value)?)
    }
}

impl DexSerialize for f32 {
    fn decompose(&self, _sel: &Serialization) -> Value {
        Value::Num(f64::from(*self))
    }

    fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
        Ok(f64::try_from(value)? as f32)
    }
}

macro_rules! integer_serialize {
    ($($ty:ty),*) => {$(
        impl DexSerialize for $ty {
            fn decompose(&self, _sel: &Serialization) -> Value {
                Value::Num(*self as f64)
            }

            fn compose(value: &Value, _sel: &Serialization) -> Result<Self, ComposeError> {
                let wide = i64::try_from(value)?;
                <$ty>::try_from(wide).map_err(|_| {
                    ComposeError::Coerce(CoerceError::OutOfRange {
                        value: wide as f64,
                        target: stringify!($ty),
                    })
                })
            }
        }
    )*};
}

integer_serialize!(i8, i16, i32, i64, u8, u16, u32);

impl<T: DexSerialize + 'static> DexSerialize for Vec<T> {
    fn decompose(&self, sel: &Serialization) -> Value {
        let mut builder = Table::builder_with_capacity("", self.len());
        for item in self {
            builder = builder.add(sel.decompose(item));
        }
        Value::Table(builder.create())
    }

    fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
        let table = Serialization::as_table(value)?;
        table
            .values()
            .into_iter()
            .map(|v| T::compose(v, sel))
            .collect()
    }
}

impl<T: DexSerialize + 'static> DexSerialize for BTreeMap<String, T> {
    fn decompose(&self, sel: &Serialization) -> Value {
        let mut builder = Table::builder_with_capacity("", self.len());
        for (key, item) in self {
            builder = builder.put(key.clone(), sel.decompose(item));
        }
        Value::Table(builder.create())
    }

    fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
        let table = Serialization::as_table(value)?;
        table
            .iter()
            .map(|(key, v)| {
                let key = key.as_str().ok_or(CoerceError::Mismatch {
                    expected: "string",
                    found: key.type_name(),
                })?;
                Ok((key.to_string(), T::compose(v, sel)?))
            })
            .collect()
    }
}

impl<T: DexSerialize + 'static> DexSerialize for HashMap<String, T> {
    fn decompose(&self, sel: &Serialization) -> Value {
        let mut builder = Table::builder_with_capacity("", self.len());
        for (key, item) in self {
            builder = builder.put(key.clone(), sel.decompose(item));
        }
        Value::Table(builder.create())
    }

    fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
        let table = Serialization::as_table(value)?;
        table
            .iter()
            .map(|(key, v)| {
                let key = key.as_str().ok_or(CoerceError::Mismatch {
                    expected: "string",
                    found: key.type_name(),
                })?;
                Ok((key.to_string(), T::compose(v, sel)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
    }

    impl DexSerialize for Point {
        fn decompose(&self, sel: &Serialization) -> Value {
            Table::builder()
                .put("x", sel.decompose(&self.x))
                .put("y", sel.decompose(&self.y))
                .create()
                .into()
        }

        fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
            let table = Serialization::as_table(value)?;
            Ok(Point {
                x: sel.compose(table.field("x")?)?,
                y: sel.compose(table.field("y")?)?,
            })
        }
    }

    #[test]
    fn registered_tag_is_attached_and_dispatched() {
        let mut sel = Serialization::new();
        sel.register_tag::<Point>("point");

        let value = sel.decompose(&Point { x: 100.0, y: 100.0 });
        let table = value.as_table().unwrap();
        assert_eq!(table.tag(), "point");

        let composed = sel.compose_tagged(table).unwrap();
        let point = composed.downcast_ref::<Point>().unwrap();
        assert_eq!(point, &Point { x: 100.0, y: 100.0 });
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let sel = Serialization::new();
        let table = Table::builder_tagged("ghost").create();
        assert!(matches!(
            sel.compose_tagged(&table),
            Err(ComposeError::UnknownTag(tag)) if tag == "ghost"
        ));
        let untagged = Table::builder().create();
        assert!(matches!(
            sel.compose_tagged(&untagged),
            Err(ComposeError::MissingTag)
        ));
    }

    #[test]
    fn collections_round_trip() {
        let sel = Serialization::new();
        let list = vec![1i64, 2, 3];
        let value = sel.decompose(&list);
        assert!(value.as_table().unwrap().is_array());
        let back: Vec<i64> = sel.compose(&value).unwrap();
        assert_eq!(back, list);

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1.5f64);
        map.insert("b".to_string(), 2.5);
        let value = sel.decompose(&map);
        let back: BTreeMap<String, f64> = sel.compose(&value).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn missing_field_is_reported() {
        let sel = Serialization::new();
        let table = Value::Table(Table::builder().put("x", 1).create());
        assert!(matches!(
            Point::compose(&table, &sel),
            Err(ComposeError::MissingField(field)) if field == "y"
        ));
    }

    #[test]
    fn integer_narrowing_checks_range() {
        let sel = Serialization::new();
        let value = Value::from(300);
        assert!(matches!(
            sel.compose::<u8>(&value),
            Err(ComposeError::Coerce(CoerceError::OutOfRange { .. }))
        ));
        assert_eq!(sel.compose::<u16>(&value).unwrap(), 300);
    }

    #[test]
    fn dynamic_decompose_uses_type_identity() {
        let mut sel = Serialization::new();
        sel.register_tag::<Point>("point");
        let point = Point { x: 1.0, y: 2.0 };
        let value = sel.decompose_dyn(&point).unwrap();
        assert_eq!(value.as_table().unwrap().tag(), "point");
        assert!(sel.decompose_dyn(&"unregistered").is_none());
    }
}
