//! File entry points.
//!
//! Writing renders the whole document in memory and then performs a single
//! write. I/O failures are reported with the offending path and never retried.

use crate::error::{JsonError, Result};
use crate::field::JsonObject;
use crate::options::{ReadOptions, WriteOptions};
use crate::reader::read_from_str_with;
use crate::writer::serialize_with;
use log::debug;
use std::fs;
use std::path::Path;

/// Serialize `value` with bare keys and write it to `path`.
pub fn write_to_file<T: JsonObject + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    write_to_file_with(value, path, &WriteOptions::default())
}

/// Serialize `value` with explicit options and write it to `path`.
pub fn write_to_file_with<T: JsonObject + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let text = serialize_with(value, options)?;
    fs::write(path, &text).map_err(|source| JsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Read `path` and bind its contents into `target`.
pub fn read_from_file<T: JsonObject + ?Sized>(
    path: impl AsRef<Path>,
    target: &mut T,
) -> Result<()> {
    read_from_file_with(path, target, &ReadOptions::default())
}

/// Read `path` with explicit options and bind its contents into `target`.
pub fn read_from_file_with<T: JsonObject + ?Sized>(
    path: impl AsRef<Path>,
    target: &mut T,
    options: &ReadOptions,
) -> Result<()> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| JsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", text.len(), path.display());
    read_from_str_with(&text, target, options)
}
