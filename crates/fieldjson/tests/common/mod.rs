//! Fixture types shared by the integration tests.
//!
//! `A`, `B` and `C` model a small hierarchy: `B` and `C` embed an `A` and
//! each expose a different subset of fields. `Holder` owns polymorphic slots
//! over the `Piece` family.

#![allow(dead_code)]

use fieldjson::{
    field, lens, variant, Field, FieldSet, JsonObject, ObjectFields, Polymorphic,
    PolymorphicEntry,
};
use std::sync::LazyLock;

/// Common handle type for the `A` hierarchy.
pub trait Base: JsonObject {
    fn base(&self) -> &A;
}

#[derive(Debug, Clone, PartialEq)]
pub struct A {
    pub w: bool,
    pub x: i32,
}

impl Default for A {
    fn default() -> Self {
        A { w: true, x: 1 }
    }
}

static A_FIELDS: LazyLock<FieldSet<A>> =
    LazyLock::new(|| FieldSet::new([field!(A, w), field!(A, x)]));

impl A {
    pub fn field_set() -> &'static FieldSet<A> {
        &A_FIELDS
    }
}

impl JsonObject for A {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        &*A_FIELDS
    }
}

impl Base for A {
    fn base(&self) -> &A {
        self
    }
}

/// Exposes `w` from its base and its own `y`, but not `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct B {
    pub base: A,
    pub y: f32,
}

impl Default for B {
    fn default() -> Self {
        B {
            base: A::default(),
            y: 2.0,
        }
    }
}

impl JsonObject for B {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<B>> =
            LazyLock::new(|| FieldSet::new([field!(B, base.w as "w"), field!(B, y)]));
        &*FIELDS
    }
}

impl Base for B {
    fn base(&self) -> &A {
        &self.base
    }
}

/// Reuses `A`'s own `w` descriptor through its embedded base.
#[derive(Debug, Clone, PartialEq)]
pub struct C {
    pub base: A,
    pub z: String,
}

impl Default for C {
    fn default() -> Self {
        C {
            base: A::default(),
            z: "hello".to_string(),
        }
    }
}

impl JsonObject for C {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<C>> = LazyLock::new(|| {
            let inherited = A::field_set()
                .get("w")
                .cloned()
                .map(|w| w.through(lens!(C, base)));
            FieldSet::new(inherited.into_iter().chain([field!(C, z)]))
        });
        &*FIELDS
    }
}

impl Base for C {
    fn base(&self) -> &A {
        &self.base
    }
}

/// Polymorphic family read and written through `Holder`.
pub trait Piece: JsonObject {}

#[derive(Debug, Default, PartialEq)]
pub struct One {
    pub x: i32,
}

impl JsonObject for One {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<One>> = LazyLock::new(|| FieldSet::new([field!(One, x)]));
        &*FIELDS
    }
}

impl Piece for One {}

#[derive(Debug, Default, PartialEq)]
pub struct Two {
    pub s: String,
}

impl JsonObject for Two {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<Two>> = LazyLock::new(|| FieldSet::new([field!(Two, s)]));
        &*FIELDS
    }
}

impl Piece for Two {}

/// Never registered; writing one must fail.
#[derive(Debug, Default)]
pub struct Stray;

impl JsonObject for Stray {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<Stray>> = LazyLock::new(|| FieldSet::new([]));
        &*FIELDS
    }
}

impl Piece for Stray {}

pub static PIECES: [PolymorphicEntry<dyn Piece>; 2] =
    [variant!("One" => One), variant!("Two" => Two)];

fn pieces() -> Polymorphic<dyn Piece> {
    Polymorphic::new(&PIECES[..]).discriminator_key("kind")
}

#[derive(Default)]
pub struct Holder {
    pub item: Option<Box<dyn Piece>>,
    pub arr: Vec<Option<Box<dyn Piece>>>,
}

impl JsonObject for Holder {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<Holder>> = LazyLock::new(|| {
            FieldSet::new([
                Field::polymorphic("item", lens!(Holder, item), pieces()),
                Field::polymorphic_array("arr", lens!(Holder, arr), pieces()),
            ])
        });
        &*FIELDS
    }
}

/// Nested composites plus a polymorphic slot under the default discriminator.
#[derive(Default)]
pub struct Envelope {
    pub id: u64,
    pub header: A,
    pub history: Vec<A>,
    pub note: Option<String>,
    pub payload: Option<Box<dyn Piece>>,
}

impl JsonObject for Envelope {
    fn json_fields(&self) -> &'static dyn ObjectFields {
        static FIELDS: LazyLock<FieldSet<Envelope>> = LazyLock::new(|| {
            FieldSet::new([
                field!(Envelope, id),
                Field::object("header", lens!(Envelope, header)),
                Field::object_array("history", lens!(Envelope, history)),
                field!(Envelope, note),
                Field::polymorphic(
                    "payload",
                    lens!(Envelope, payload),
                    Polymorphic::new(&PIECES[..]),
                ),
            ])
        });
        &*FIELDS
    }
}

/// Downcast a populated slot to its concrete variant.
pub fn slot_as<T: 'static>(slot: &Option<Box<dyn Piece>>) -> Option<&T> {
    slot.as_deref()?.as_any().downcast_ref::<T>()
}
