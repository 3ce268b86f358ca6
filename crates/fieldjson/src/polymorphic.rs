//! Polymorphic members: owning slots whose concrete type is chosen by a
//! discriminator string.
//!
//! Each polymorphic field carries its own [`Registry`] of
//! `(discriminator, factory)` entries. Reading looks the discriminator up by
//! name and binds the remaining keys into a fresh instance; writing finds the
//! entry by the instance's runtime type and emits its discriminator first.
//!
//! Entries record the concrete type when they are registered, so the write
//! path is a direct type lookup and never calls a factory.

use crate::error::{JsonError, Result};
use crate::field::{mismatch, Accessor, Field, JsonObject, Lens};
use crate::value::Value;
use log::trace;
use std::any::{Any, TypeId};
use std::borrow::Cow;

/// Discriminator key used when a field does not name its own.
pub const DEFAULT_DISCRIMINATOR_KEY: &str = "type";

/// One registered variant of the common type `P` (usually `dyn Trait`).
pub struct PolymorphicEntry<P: ?Sized> {
    name: &'static str,
    factory: fn() -> Box<P>,
    type_tag: fn() -> TypeId,
}

impl<P: ?Sized> PolymorphicEntry<P> {
    /// Register `C` under `name`. `factory` must produce a `C`; the
    /// [`variant!`](crate::variant) macro guarantees that.
    pub const fn new<C: Any>(name: &'static str, factory: fn() -> Box<P>) -> Self {
        PolymorphicEntry {
            name,
            factory,
            type_tag: TypeId::of::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A freshly allocated default instance of this variant.
    pub fn create(&self) -> Box<P> {
        (self.factory)()
    }

    pub fn type_tag(&self) -> TypeId {
        (self.type_tag)()
    }
}

impl<P: ?Sized> Clone for PolymorphicEntry<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for PolymorphicEntry<P> {}

/// Ordered variants available to one polymorphic field.
pub struct Registry<P: ?Sized> {
    entries: Vec<PolymorphicEntry<P>>,
}

impl<P: ?Sized> Clone for Registry<P> {
    fn clone(&self) -> Self {
        Registry {
            entries: self.entries.clone(),
        }
    }
}

impl<P: ?Sized> Registry<P> {
    pub fn new(entries: impl IntoIterator<Item = PolymorphicEntry<P>>) -> Self {
        Registry {
            entries: entries.into_iter().collect(),
        }
    }

    /// First entry registered under exactly `name` (case-sensitive).
    pub fn resolve(&self, name: &str) -> Option<&PolymorphicEntry<P>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First entry registered for the concrete type `type_id`.
    pub fn identify(&self, type_id: TypeId) -> Option<&PolymorphicEntry<P>> {
        self.entries.iter().find(|e| e.type_tag() == type_id)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized> From<&[PolymorphicEntry<P>]> for Registry<P> {
    fn from(entries: &[PolymorphicEntry<P>]) -> Self {
        Registry::new(entries.iter().copied())
    }
}

impl<P: ?Sized, const N: usize> From<[PolymorphicEntry<P>; N]> for Registry<P> {
    fn from(entries: [PolymorphicEntry<P>; N]) -> Self {
        Registry::new(entries)
    }
}

impl<P: ?Sized> From<Vec<PolymorphicEntry<P>>> for Registry<P> {
    fn from(entries: Vec<PolymorphicEntry<P>>) -> Self {
        Registry { entries }
    }
}

/// Configuration of one polymorphic field: its registry and discriminator key.
pub struct Polymorphic<P: ?Sized> {
    registry: Registry<P>,
    discriminator_key: Cow<'static, str>,
}

impl<P: ?Sized> Clone for Polymorphic<P> {
    fn clone(&self) -> Self {
        Polymorphic {
            registry: self.registry.clone(),
            discriminator_key: self.discriminator_key.clone(),
        }
    }
}

impl<P: ?Sized + JsonObject> Polymorphic<P> {
    pub fn new(registry: impl Into<Registry<P>>) -> Self {
        Polymorphic {
            registry: registry.into(),
            discriminator_key: Cow::Borrowed(DEFAULT_DISCRIMINATOR_KEY),
        }
    }

    /// Use `key` instead of [`DEFAULT_DISCRIMINATOR_KEY`].
    pub fn discriminator_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.discriminator_key
    }

    pub fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    /// Object value of `instance` with its discriminator emitted first.
    /// A field of the instance named like the discriminator is not emitted.
    pub fn write(&self, instance: &P) -> Result<Value> {
        let fields = instance.json_fields();
        let entry = self
            .registry
            .identify(instance.as_any().type_id())
            .ok_or_else(|| JsonError::UnregisteredVariant {
                key: String::new(),
                type_name: fields.type_name(),
            })?;
        let mut entries = vec![(
            self.discriminator_key.to_string(),
            Value::String(entry.name.to_string()),
        )];
        entries.extend(
            fields
                .to_entries(instance.as_any())?
                .into_iter()
                .filter(|(k, _)| *k != self.discriminator_key),
        );
        Ok(Value::Object(entries))
    }

    /// Allocate the variant named by the discriminator in `entries` and bind
    /// the remaining keys into it.
    pub fn read(&self, entries: &[(String, Value)]) -> Result<Box<P>> {
        let key: &str = &self.discriminator_key;
        let selector = entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| JsonError::MissingDiscriminator {
                key: String::new(),
                discriminator: key.to_string(),
            })?;
        let name = selector
            .as_str()
            .ok_or_else(|| mismatch("string", selector).within(key))?;
        let entry = self
            .registry
            .resolve(name)
            .ok_or_else(|| JsonError::UnknownVariant {
                key: String::new(),
                variant: name.to_string(),
            })?;
        trace!("resolved variant `{name}` via `{key}`");
        let mut instance = entry.create();
        crate::reader::bind_entries(&mut *instance, entries, Some(key))?;
        Ok(instance)
    }

    fn read_slot(&self, value: &Value) -> Result<Option<Box<P>>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(entries) => self.read(entries).map(Some),
            other => Err(mismatch("object or null", other)),
        }
    }

    fn write_slot(&self, slot: &Option<Box<P>>) -> Result<Value> {
        match slot {
            Some(instance) => self.write(instance),
            None => Ok(Value::Null),
        }
    }
}

struct PolymorphicSlot<T, P: ?Sized> {
    lens: Lens<T, Option<Box<P>>>,
    config: Polymorphic<P>,
}

impl<T, P: ?Sized + JsonObject> Accessor<T> for PolymorphicSlot<T, P> {
    fn get(&self, owner: &T) -> Result<Value> {
        self.config.write_slot(self.lens.get(owner))
    }

    fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        *self.lens.get_mut(owner) = self.config.read_slot(value)?;
        Ok(())
    }
}

struct PolymorphicArray<T, P: ?Sized> {
    lens: Lens<T, Vec<Option<Box<P>>>>,
    config: Polymorphic<P>,
}

impl<T, P: ?Sized + JsonObject> Accessor<T> for PolymorphicArray<T, P> {
    fn get(&self, owner: &T) -> Result<Value> {
        self.lens
            .get(owner)
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                self.config
                    .write_slot(slot)
                    .map_err(|e| e.within(&format!("[{i}]")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn set(&self, owner: &mut T, value: &Value) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(mismatch("array", value));
        };
        let slots = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.config
                    .read_slot(item)
                    .map_err(|e| e.within(&format!("[{i}]")))
            })
            .collect::<Result<Vec<_>>>()?;
        *self.lens.get_mut(owner) = slots;
        Ok(())
    }
}

impl<T: 'static> Field<T> {
    /// A single owning slot holding zero or one variant of `P`.
    pub fn polymorphic<P: ?Sized + JsonObject>(
        key: impl Into<Cow<'static, str>>,
        lens: Lens<T, Option<Box<P>>>,
        config: Polymorphic<P>,
    ) -> Self {
        Field::from_accessor(key, PolymorphicSlot { lens, config })
    }

    /// A sequence of owning slots; `null` elements are empty slots.
    pub fn polymorphic_array<P: ?Sized + JsonObject>(
        key: impl Into<Cow<'static, str>>,
        lens: Lens<T, Vec<Option<Box<P>>>>,
        config: Polymorphic<P>,
    ) -> Self {
        Field::from_accessor(key, PolymorphicArray { lens, config })
    }
}

/// Build a [`PolymorphicEntry`] for a `Default` type:
/// `variant!("Circle" => Circle)`. Usable in `const` and `static` items.
#[macro_export]
macro_rules! variant {
    ($name:expr => $ty:ty) => {
        $crate::PolymorphicEntry::new::<$ty>($name, || {
            ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
        })
    };
}
