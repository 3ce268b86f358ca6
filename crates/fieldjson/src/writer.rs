//! Writer: object → [`Value`] tree → compact text.
//!
//! Output is compact JSON with no whitespace. Keys are emitted bare
//! (`{w:true,x:1}`) unless [`KeyStyle::Quoted`] is selected; a key that is not
//! identifier-safe is quoted in either style so the text always re-parses.
//!
//! Numbers use the shortest text that parses back to the same value at the
//! member's own width, so `2.0f32` renders as `2` and `3.14f32` as `3.14`.

use crate::error::Result;
use crate::field::JsonObject;
use crate::options::{KeyStyle, WriteOptions};
use crate::value::Value;

/// Build the value tree of `value` through its runtime field set.
pub fn to_value<T: JsonObject + ?Sized>(value: &T) -> Result<Value> {
    let fields = value.json_fields();
    fields.to_entries(value.as_any()).map(Value::Object)
}

/// Serialize `value` with bare keys.
///
/// ```
/// # use std::sync::LazyLock;
/// # use fieldjson::{field, FieldSet, JsonObject, ObjectFields};
/// struct Flag { on: bool, label: String }
///
/// impl JsonObject for Flag {
///     fn json_fields(&self) -> &'static dyn ObjectFields {
///         static FIELDS: LazyLock<FieldSet<Flag>> =
///             LazyLock::new(|| FieldSet::new([field!(Flag, on), field!(Flag, label)]));
///         &*FIELDS
///     }
/// }
///
/// let flag = Flag { on: true, label: "a\"b".into() };
/// assert_eq!(fieldjson::serialize(&flag).unwrap(), r#"{on:true,label:"a\"b"}"#);
/// ```
pub fn serialize<T: JsonObject + ?Sized>(value: &T) -> Result<String> {
    serialize_with(value, &WriteOptions::default())
}

/// Serialize `value` with explicit options.
pub fn serialize_with<T: JsonObject + ?Sized>(value: &T, options: &WriteOptions) -> Result<String> {
    Ok(render(&to_value(value)?, options))
}

/// Render a value tree as compact text.
pub fn render(value: &Value, options: &WriteOptions) -> String {
    let mut out = String::new();
    render_value(value, options, &mut out);
    out
}

pub(crate) fn render_value(value: &Value, options: &WriteOptions, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(n.as_str()),
        Value::String(s) => encode_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render_value(item, options, out);
            }
            out.push(']');
        }
        Value::Object(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_key(key, options.key_style, out);
                out.push(':');
                render_value(item, options, out);
            }
            out.push('}');
        }
    }
}

/// Emit an object key: bare when the style allows it and the key is
/// identifier-safe, quoted otherwise.
fn encode_key(key: &str, style: KeyStyle, out: &mut String) {
    if style == KeyStyle::Bare && is_identifier(key) {
        out.push_str(key);
    } else {
        encode_string(key, out);
    }
}

/// Identifier-safe keys match `^[A-Za-z_$][A-Za-z0-9_$]*$`.
pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => {}
        _ => return false,
    }
    chars.all(is_identifier_continue)
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Double-quoted string with standard JSON escaping.
fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
