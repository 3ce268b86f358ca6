//! Field descriptors and per-type field sets.
//!
//! A type opts into the engine by implementing [`JsonObject`], whose
//! `json_fields` method returns the type's [`FieldSet`]. The method is
//! dispatched dynamically: a `dyn Trait` handle (where `Trait: JsonObject`)
//! always resolves to the field set of the concrete runtime type.
//!
//! Field sets are built once per type, usually in a `static LazyLock`:
//!
//! ```
//! use std::sync::LazyLock;
//! use fieldjson::{field, FieldSet, JsonObject, ObjectFields};
//!
//! #[derive(Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl JsonObject for Point {
//!     fn json_fields(&self) -> &'static dyn ObjectFields {
//!         static FIELDS: LazyLock<FieldSet<Point>> =
//!             LazyLock::new(|| FieldSet::new([field!(Point, x), field!(Point, y)]));
//!         &*FIELDS
//!     }
//! }
//!
//! assert_eq!(fieldjson::serialize(&Point { x: 1, y: -2 }).unwrap(), "{x:1,y:-2}");
//! ```

use crate::error::{JsonError, Result};
use crate::value::{Number, Value};
use log::debug;
use std::any::{type_name, Any};
use std::borrow::Cow;
use std::sync::Arc;

/// A type whose fields can be written to and bound from JSON.
pub trait JsonObject: Upcast {
    /// The field set of the concrete runtime type.
    fn json_fields(&self) -> &'static dyn ObjectFields;
}

/// Conversions from any [`JsonObject`] handle, including `dyn Trait`, back to
/// the concrete type's `Any` and `dyn JsonObject` views.
///
/// Implemented for every sized `JsonObject`; never implement it by hand.
pub trait Upcast: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_json_object(&self) -> &dyn JsonObject;
    fn as_json_object_mut(&mut self) -> &mut dyn JsonObject;
}

impl<T: JsonObject> Upcast for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_json_object(&self) -> &dyn JsonObject {
        self
    }

    fn as_json_object_mut(&mut self) -> &mut dyn JsonObject {
        self
    }
}

/// A type-erased field set, as returned by [`JsonObject::json_fields`].
///
/// `target` must be an instance of the set's own type; anything else fails
/// with [`JsonError::FieldSetMismatch`].
pub trait ObjectFields: Send + Sync {
    /// Name of the type this set describes.
    fn type_name(&self) -> &'static str;

    /// Declared keys, in declaration order.
    fn keys(&self) -> Vec<&str>;

    /// Read every declared field of `target`, in declaration order.
    fn to_entries(&self, target: &dyn Any) -> Result<Vec<(String, Value)>>;

    /// Apply one input entry to `target`. Returns `false` when no field is
    /// declared under `key`.
    fn bind_entry(&self, target: &mut dyn Any, key: &str, value: &Value) -> Result<bool>;
}

/// Borrowing accessor pair for one member of `T`, the stand-in for a
/// pointer-to-member. Build it with [`lens!`](crate::lens).
pub struct Lens<T, V: ?Sized> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V: ?Sized> Lens<T, V> {
    pub fn new(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Lens { get, get_mut }
    }

    pub fn get<'a>(&self, owner: &'a T) -> &'a V {
        (self.get)(owner)
    }

    pub fn get_mut<'a>(&self, owner: &'a mut T) -> &'a mut V {
        (self.get_mut)(owner)
    }
}

impl<T, V: ?Sized> Clone for Lens<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V: ?Sized> Copy for Lens<T, V> {}

/// Get/set pair behind a [`Field`]. Errors are raised with keys relative to
/// the field; [`Field`] prefixes its own key.
pub(crate) trait Accessor<T>: Send + Sync {
    fn get(&self, owner: &T) -> Result<Value>;
    fn set(&self, owner: &mut T, value: &Value) -> Result<()>;
}

/// One named, typed binding between a JSON key and a member of `T`.
pub struct Field<T> {
    key: Cow<'static, str>,
    accessor: Arc<dyn Accessor<T>>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field {
            key: self.key.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T: 'static> Field<T> {
    pub(crate) fn from_accessor(
        key: impl Into<Cow<'static, str>>,
        accessor: impl Accessor<T> + 'static,
    ) -> Self {
        Field {
            key: key.into(),
            accessor: Arc::new(accessor),
        }
    }

    /// A scalar, string, optional, or list member.
    pub fn new<V: FieldValue + 'static>(
        key: impl Into<Cow<'static, str>>,
        lens: Lens<T, V>,
    ) -> Self {
        Field::from_accessor(key, Leaf(lens))
    }

    /// A nested object, written and bound through its own field set.
    /// Binding updates the nested value in place.
    pub fn object<V: JsonObject>(key: impl Into<Cow<'static, str>>, lens: Lens<T, V>) -> Self {
        Field::from_accessor(key, Nested(lens))
    }

    /// A list of nested objects. Each input element is bound into a fresh
    /// `V::default()`.
    pub fn object_array<V: JsonObject + Default>(
        key: impl Into<Cow<'static, str>>,
        lens: Lens<T, Vec<V>>,
    ) -> Self {
        Field::from_accessor(key, NestedArray(lens))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Same binding under another key.
    pub fn rename(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = key.into();
        self
    }

    /// Re-own this field through a lens from `U` to the embedded `T`, so a
    /// type can expose a field declared on a struct it contains.
    pub fn through<U: 'static>(self, lens: Lens<U, T>) -> Field<U> {
        Field {
            key: self.key,
            accessor: Arc::new(Projected {
                lens,
                inner: self.accessor,
            }),
        }
    }

    /// Read the member as a [`Value`].
    pub fn get(&self, owner: &T) -> Result<Value> {
        self.accessor.get(owner).map_err(|e| e.within(&self.key))
    }

    /// Convert `value` and store it in the member.
    pub fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        self.accessor
            .set(owner, value)
            .map_err(|e| e.within(&self.key))
    }
}

/// The ordered, immutable field list of one concrete type.
pub struct FieldSet<T> {
    fields: Vec<Field<T>>,
}

impl<T: 'static> FieldSet<T> {
    pub fn new(fields: impl IntoIterator<Item = Field<T>>) -> Self {
        let fields: Vec<Field<T>> = fields.into_iter().collect();
        debug!(
            "built field set for {} with {} fields",
            type_name::<T>(),
            fields.len()
        );
        FieldSet { fields }
    }

    /// First field declared under `key`.
    pub fn get(&self, key: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<T>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn owner<'a>(&self, target: &'a dyn Any) -> Result<&'a T> {
        target
            .downcast_ref::<T>()
            .ok_or(JsonError::FieldSetMismatch {
                expected: type_name::<T>(),
            })
    }

    fn owner_mut<'a>(&self, target: &'a mut dyn Any) -> Result<&'a mut T> {
        target
            .downcast_mut::<T>()
            .ok_or(JsonError::FieldSetMismatch {
                expected: type_name::<T>(),
            })
    }
}

impl<T: 'static> ObjectFields for FieldSet<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(Field::key).collect()
    }

    fn to_entries(&self, target: &dyn Any) -> Result<Vec<(String, Value)>> {
        let owner = self.owner(target)?;
        self.fields
            .iter()
            .map(|field| Ok((field.key().to_string(), field.get(owner)?)))
            .collect()
    }

    fn bind_entry(&self, target: &mut dyn Any, key: &str, value: &Value) -> Result<bool> {
        let owner = self.owner_mut(target)?;
        match self.get(key) {
            Some(field) => {
                field.set(owner, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Build a type-mismatch error for the current (field-relative) position.
pub(crate) fn mismatch(expected: &'static str, found: &Value) -> JsonError {
    JsonError::TypeMismatch {
        key: String::new(),
        expected,
        found: found.kind(),
    }
}

struct Leaf<T, V>(Lens<T, V>);

impl<T, V: FieldValue> Accessor<T> for Leaf<T, V> {
    fn get(&self, owner: &T) -> Result<Value> {
        Ok(self.0.get(owner).to_value())
    }

    fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        self.0.get_mut(owner).assign(value)
    }
}

struct Nested<T, V>(Lens<T, V>);

impl<T, V: JsonObject> Accessor<T> for Nested<T, V> {
    fn get(&self, owner: &T) -> Result<Value> {
        crate::writer::to_value(self.0.get(owner))
    }

    fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        match value {
            Value::Object(entries) => {
                crate::reader::bind_entries(self.0.get_mut(owner), entries, None)
            }
            other => Err(mismatch("object", other)),
        }
    }
}

struct NestedArray<T, V>(Lens<T, Vec<V>>);

impl<T, V: JsonObject + Default> Accessor<T> for NestedArray<T, V> {
    fn get(&self, owner: &T) -> Result<Value> {
        self.0
            .get(owner)
            .iter()
            .enumerate()
            .map(|(i, item)| {
                crate::writer::to_value(item).map_err(|e| e.within(&format!("[{i}]")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(mismatch("array", value));
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let mut element = V::default();
            match item {
                Value::Object(entries) => {
                    crate::reader::bind_entries(&mut element, entries, None)
                        .map_err(|e| e.within(&format!("[{i}]")))?
                }
                other => return Err(mismatch("object", other).within(&format!("[{i}]"))),
            }
            out.push(element);
        }
        *self.0.get_mut(owner) = out;
        Ok(())
    }
}

struct Projected<U, T> {
    lens: Lens<U, T>,
    inner: Arc<dyn Accessor<T>>,
}

impl<U, T> Accessor<U> for Projected<U, T> {
    fn get(&self, owner: &U) -> Result<Value> {
        self.inner.get(self.lens.get(owner))
    }

    fn set(&self, owner: &mut U, value: &Value) -> Result<()> {
        self.inner.set(self.lens.get_mut(owner), value)
    }
}

/// Leaf member types: conversion to and from a [`Value`].
///
/// Conversions are strict; anything that does not fit the target type fails
/// with [`JsonError::TypeMismatch`] rather than falling back to a default.
pub trait FieldValue {
    fn to_value(&self) -> Value;
    fn assign(&mut self, value: &Value) -> Result<()>;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = value.as_bool().ok_or_else(|| mismatch("bool", value))?;
        Ok(())
    }
}

macro_rules! integer_field_value {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                fn to_value(&self) -> Value {
                    Value::Number(Number::from(*self))
                }

                fn assign(&mut self, value: &Value) -> Result<()> {
                    *self = value
                        .as_number()
                        .filter(|n| n.is_integral())
                        .and_then(|n| n.parse_integer::<$t>())
                        .ok_or_else(|| mismatch(stringify!($t), value))?;
                    Ok(())
                }
            }
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// NaN and infinities are written as `null`, which does not bind back into
/// the member: reading that output fails with [`JsonError::TypeMismatch`]
/// and leaves the member unchanged. Wrap the member in `Option` to round-trip
/// a missing value.
impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Number::from_f32(*self).map_or(Value::Null, Value::Number)
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = value
            .as_number()
            .and_then(|n| n.parse::<f32>())
            .filter(|f| f.is_finite())
            .ok_or_else(|| mismatch("f32", value))?;
        Ok(())
    }
}

/// Same `null` handling for non-finite values as `f32`.
impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = value
            .as_number()
            .and_then(|n| n.parse::<f64>())
            .filter(|f| f.is_finite())
            .ok_or_else(|| mismatch("f64", value))?;
        Ok(())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        let s = value.as_str().ok_or_else(|| mismatch("string", value))?;
        s.clone_into(self);
        Ok(())
    }
}

/// Raw passthrough: the member keeps whatever JSON it was given.
impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = value.clone();
        Ok(())
    }
}

/// `None` is written as `null`, and `null` binds as `None`.
impl<V: FieldValue + Default> FieldValue for Option<V> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = V::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<V: FieldValue + Default> FieldValue for Vec<V> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(mismatch("array", value));
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let mut element = V::default();
            element
                .assign(item)
                .map_err(|e| e.within(&format!("[{i}]")))?;
            out.push(element);
        }
        *self = out;
        Ok(())
    }
}

/// Build a [`Lens`] for a (possibly nested) member path of a type.
///
/// ```
/// # use fieldjson::lens;
/// struct Base { w: bool }
/// struct Derived { base: Base }
/// let l = lens!(Derived, base.w);
/// assert!(*l.get(&Derived { base: Base { w: true } }));
/// ```
#[macro_export]
macro_rules! lens {
    ($ty:ty, $($member:tt).+) => {
        $crate::Lens::<$ty, _>::new(
            |owner| &owner.$($member).+,
            |owner| &mut owner.$($member).+,
        )
    };
}

/// Build a leaf [`Field`]: `field!(Type, member)` uses the member name as the
/// key, `field!(Type, path.to.member as "key")` names it explicitly.
#[macro_export]
macro_rules! field {
    ($ty:ty, $member:ident) => {
        $crate::Field::new(stringify!($member), $crate::lens!($ty, $member))
    };
    ($ty:ty, $($member:tt).+ as $key:expr) => {
        $crate::Field::new($key, $crate::lens!($ty, $($member).+))
    };
}
