//! Error types for serialization, parsing, and binding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing, parsing, or binding JSON.
#[derive(Error, Debug)]
pub enum JsonError {
    /// The input text was not valid JSON.
    /// `offset` is the byte offset; `line` and `column` are 1-based.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// An input value could not be converted into the target field's type.
    #[error("type mismatch at `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A discriminator named a variant missing from the field's registry.
    #[error("unknown variant `{variant}` at `{key}`")]
    UnknownVariant { key: String, variant: String },

    /// A polymorphic payload had no discriminator key.
    #[error("missing discriminator `{discriminator}` at `{key}`")]
    MissingDiscriminator { key: String, discriminator: String },

    /// A polymorphic slot held an instance whose type is not registered for it.
    #[error("instance of `{type_name}` at `{key}` has no registered variant")]
    UnregisteredVariant {
        key: String,
        type_name: &'static str,
    },

    /// A field set was applied to an instance of another type.
    #[error("field set for `{expected}` applied to an instance of a different type")]
    FieldSetMismatch { expected: &'static str },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JsonError {
    /// Prefix the key path of a keyed error with `parent`.
    ///
    /// `key` then `parent = "item"` becomes `item.key`; an index segment such
    /// as `[2]` is joined without a dot. Errors without a key pass through.
    pub fn within(mut self, parent: &str) -> Self {
        match &mut self {
            JsonError::TypeMismatch { key, .. }
            | JsonError::UnknownVariant { key, .. }
            | JsonError::MissingDiscriminator { key, .. }
            | JsonError::UnregisteredVariant { key, .. } => {
                *key = join_path(parent, key);
            }
            _ => {}
        }
        self
    }

    /// The key path carried by this error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            JsonError::TypeMismatch { key, .. }
            | JsonError::UnknownVariant { key, .. }
            | JsonError::MissingDiscriminator { key, .. }
            | JsonError::UnregisteredVariant { key, .. } => Some(key),
            _ => None,
        }
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if child.is_empty() {
        parent.to_string()
    } else if child.starts_with('[') {
        format!("{parent}{child}")
    } else {
        format!("{parent}.{child}")
    }
}

/// Convenience alias used throughout fieldjson.
pub type Result<T> = std::result::Result<T, JsonError>;
