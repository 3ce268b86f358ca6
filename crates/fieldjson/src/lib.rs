//! # fieldjson
//!
//! Field-set JSON binding: types declare which of their members are visible
//! as JSON, and the engine serializes instances to compact text and binds
//! parsed text back into them.
//!
//! Every entry point resolves the field set through [`JsonObject::json_fields`]
//! on the runtime type, so a value reached through a `dyn Trait` handle is
//! written and read with its own concrete field set. Polymorphic members
//! (`Option<Box<dyn Trait>>` and `Vec<Option<Box<dyn Trait>>>`) select their
//! concrete variant from a discriminator key at read time.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::LazyLock;
//! use fieldjson::{field, FieldSet, JsonObject, ObjectFields};
//!
//! struct Settings { verbose: bool, level: i32, ratio: f32 }
//!
//! impl Default for Settings {
//!     fn default() -> Self { Settings { verbose: true, level: 1, ratio: 2.0 } }
//! }
//!
//! impl JsonObject for Settings {
//!     fn json_fields(&self) -> &'static dyn ObjectFields {
//!         static FIELDS: LazyLock<FieldSet<Settings>> = LazyLock::new(|| {
//!             FieldSet::new([
//!                 field!(Settings, verbose),
//!                 field!(Settings, level),
//!                 field!(Settings, ratio),
//!             ])
//!         });
//!         &*FIELDS
//!     }
//! }
//!
//! let text = fieldjson::serialize(&Settings::default()).unwrap();
//! assert_eq!(text, "{verbose:true,level:1,ratio:2}");
//!
//! let mut settings = Settings::default();
//! fieldjson::read_from_str(r#"{"level":7,"extra":null}"#, &mut settings).unwrap();
//! assert_eq!(settings.level, 7);
//! assert!(settings.verbose);
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the in-memory value tree
//! - [`field`]: field descriptors, field sets, and the [`JsonObject`] trait
//! - [`polymorphic`]: discriminated owning slots and their registries
//! - [`writer`]: object → text
//! - [`reader`]: text → object
//! - [`io`]: file entry points
//! - [`options`]: writer and reader configuration
//! - [`error`]: error types

pub mod error;
pub mod field;
pub mod io;
pub mod options;
pub mod polymorphic;
pub mod reader;
pub mod value;
pub mod writer;

pub use error::{JsonError, Result};
pub use field::{Field, FieldSet, FieldValue, JsonObject, Lens, ObjectFields, Upcast};
pub use io::{read_from_file, read_from_file_with, write_to_file, write_to_file_with};
pub use options::{KeyStyle, ReadOptions, WriteOptions, DEFAULT_MAX_DEPTH};
pub use polymorphic::{Polymorphic, PolymorphicEntry, Registry, DEFAULT_DISCRIMINATOR_KEY};
pub use reader::{bind, parse, parse_with, read_from_str, read_from_str_with};
pub use value::{Number, Value};
pub use writer::{render, serialize, serialize_with, to_value};
