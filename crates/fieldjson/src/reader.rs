//! Reader: text → [`Value`] tree → object.
//!
//! [`parse`] is a recursive-descent parser over standard JSON. It also accepts
//! bare identifier keys (`{w:true}`) so the writer's own output reads back.
//! [`bind`] then walks the root object and applies each key through the
//! target's runtime field set:
//!
//! - a declared key is converted and stored; a shape mismatch fails with the
//!   key path,
//! - an undeclared key is ignored,
//! - a declared key missing from the input leaves the member untouched.

use crate::error::{JsonError, Result};
use crate::field::JsonObject;
use crate::options::ReadOptions;
use crate::value::{Number, Value};
use crate::writer::{is_identifier_continue, is_identifier_start};
use log::trace;

/// Parse `text` into a value tree with default options.
pub fn parse(text: &str) -> Result<Value> {
    parse_with(text, &ReadOptions::default())
}

/// Parse `text` into a value tree.
pub fn parse_with(text: &str, options: &ReadOptions) -> Result<Value> {
    let mut parser = Parser {
        src: text,
        bytes: text.as_bytes(),
        pos: 0,
        depth: 0,
        max_depth: options.max_depth,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("trailing characters after value"));
    }
    Ok(value)
}

/// Bind a parsed tree into `target` through its runtime field set.
/// The root must be an object.
pub fn bind<T: JsonObject + ?Sized>(tree: &Value, target: &mut T) -> Result<()> {
    match tree {
        Value::Object(entries) => bind_entries(target, entries, None),
        other => Err(JsonError::TypeMismatch {
            key: "$".to_string(),
            expected: "object",
            found: other.kind(),
        }),
    }
}

/// Parse `text` and bind it into `target`.
pub fn read_from_str<T: JsonObject + ?Sized>(text: &str, target: &mut T) -> Result<()> {
    read_from_str_with(text, target, &ReadOptions::default())
}

/// Parse `text` with explicit options and bind it into `target`.
pub fn read_from_str_with<T: JsonObject + ?Sized>(
    text: &str,
    target: &mut T,
    options: &ReadOptions,
) -> Result<()> {
    bind(&parse_with(text, options)?, target)
}

/// Apply `entries` in order, skipping `skip` (a consumed discriminator).
pub(crate) fn bind_entries<T: JsonObject + ?Sized>(
    target: &mut T,
    entries: &[(String, Value)],
    skip: Option<&str>,
) -> Result<()> {
    let fields = target.json_fields();
    let target = target.as_any_mut();
    for (key, value) in entries {
        if skip == Some(key.as_str()) {
            continue;
        }
        if !fields.bind_entry(target, key, value)? {
            trace!("ignoring undeclared key `{key}` for {}", fields.type_name());
        }
    }
    Ok(())
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser<'_> {
    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.error("expected value")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(entries));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(b':', "expected `:` after object key")?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected `,` or `}` in object")),
                None => return Err(self.error("unterminated object")),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(entries))
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '['
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected `,` or `]` in array")),
                None => return Err(self.error("unterminated array")),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Quoted key, or a bare identifier as emitted by the writer.
    fn parse_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(b'"') => self.parse_string(),
            Some(b) if is_identifier_start(b as char) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| is_identifier_continue(b as char))
                {
                    self.pos += 1;
                }
                Ok(self.src[start..self.pos].to_string())
            }
            Some(_) => Err(self.error("expected object key")),
            None => Err(self.error("unterminated object")),
        }
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.error("expected value"))
        }
    }

    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    return Err(self.error("leading zeros are not allowed"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error("expected digit")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error("expected digit after decimal point"));
            }
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error("expected digit in exponent"));
            }
            self.skip_digits();
        }
        Ok(Value::Number(Number::from_literal(&self.src[start..self.pos])))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// Parse a quoted string starting at the opening quote.
    fn parse_string(&mut self) -> Result<String> {
        self.pos += 1; // opening quote
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    let ch = self.parse_escape()?;
                    out.push(ch);
                    run_start = self.pos;
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error("control character in string"));
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Decode the escape after a backslash.
    fn parse_escape(&mut self) -> Result<char> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated string"));
        };
        self.pos += 1;
        let ch = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.parse_unicode_escape(),
            _ => {
                self.pos -= 1;
                return Err(self.error("invalid escape sequence"));
            }
        };
        Ok(ch)
    }

    /// `\uXXXX`, combining a UTF-16 surrogate pair when one follows.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let high = self.parse_hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.bytes[self.pos..].starts_with(b"\\u") {
                return Err(self.error("unpaired surrogate in unicode escape"));
            }
            self.pos += 2;
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error("invalid low surrogate in unicode escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let digits = self
            .bytes
            .get(self.pos..self.pos + 4)
            .filter(|d| d.iter().all(u8::is_ascii_hexdigit))
            .ok_or_else(|| self.error("expected four hex digits"))?;
        let mut code = 0;
        for d in digits {
            code = code * 16 + (*d as char).to_digit(16).unwrap_or(0);
        }
        self.pos += 4;
        Ok(code)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(&format!(
                "nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn expect(&mut self, byte: u8, message: &str) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Syntax error at the current position, with 1-based line and column
    /// (column counted in characters).
    fn error(&self, message: &str) -> JsonError {
        let consumed = &self.bytes[..self.pos.min(self.bytes.len())];
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        // UTF-8 continuation bytes do not start a character.
        let column = consumed[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count()
            + 1;
        JsonError::Syntax {
            offset: self.pos,
            line,
            column,
            message: message.to_string(),
        }
    }
}
