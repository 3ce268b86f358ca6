//! In-memory JSON value tree.
//!
//! The reader parses text into a [`Value`] before binding it into an object,
//! and the writer builds a [`Value`] from an object's field set before
//! rendering it. Objects are kept as ordered `(key, value)` pairs rather than
//! a map: source order is preserved and duplicate keys survive parsing.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::str::FromStr;

/// A parsed or constructed JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the value's shape, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_integral() => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in an object. With duplicate keys the last one wins,
    /// matching the order in which binding applies them.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

/// Renders compact text with bare keys, the same as [`crate::serialize`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::writer::render_value(self, &crate::WriteOptions::default(), &mut out);
        f.write_str(&out)
    }
}

/// A JSON number, stored as canonical decimal text.
///
/// Numbers read from input keep their source digits, so converting into a
/// narrower target (`f32`, `u8`, ...) parses those digits directly instead of
/// going through an intermediate `f64`. Numbers built from Rust values use the
/// shortest text that parses back to the same value at the source width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    text: String,
    integral: bool,
}

impl Number {
    /// Wrap already-validated number text (JSON number grammar).
    pub(crate) fn from_literal(text: &str) -> Self {
        let integral = !text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'));
        Number {
            text: text.to_string(),
            integral,
        }
    }

    /// `None` for NaN and infinities, which JSON cannot represent.
    pub fn from_f64(f: f64) -> Option<Self> {
        f.is_finite().then(|| Number::from_literal(&f.to_string()))
    }

    /// `None` for NaN and infinities, which JSON cannot represent.
    pub fn from_f32(f: f32) -> Option<Self> {
        f.is_finite().then(|| Number::from_literal(&f.to_string()))
    }

    /// True when the text has no fraction or exponent part.
    pub fn is_integral(&self) -> bool {
        self.integral
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parse the stored text as `T`. Integer targets reject fractional or
    /// out-of-range text; float targets accept any JSON number.
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        self.text.parse().ok()
    }

    /// Integer parse of integral text; `-0` reads as zero so it also fits
    /// unsigned targets.
    pub(crate) fn parse_integer<T: FromStr>(&self) -> Option<T> {
        match self.text.as_str() {
            "-0" => "0".parse().ok(),
            text => text.parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.parse()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.parse()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.parse()
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number { text: n.to_string(), integral: true }
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.integral {
            if let Some(i) = self.as_i64() {
                return serializer.serialize_i64(i);
            }
            if let Some(u) = self.as_u64() {
                return serializer.serialize_u64(u);
            }
        }
        match self.as_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_unit(),
        }
    }
}
