//! Writer and reader configuration.

/// How object keys are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// `{w:true}`. Keys that are not identifier-safe are still quoted.
    #[default]
    Bare,
    /// `{"w":true}`, i.e. standard JSON.
    Quoted,
}

/// Options for [`crate::serialize_with`] and [`crate::write_to_file_with`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub key_style: KeyStyle,
}

impl WriteOptions {
    /// Options producing standard JSON with every key quoted.
    pub fn standard_json() -> Self {
        WriteOptions {
            key_style: KeyStyle::Quoted,
        }
    }
}

/// Default nesting limit for [`ReadOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for [`crate::parse_with`] and the `read_*_with` entry points.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Maximum array/object nesting accepted by the parser.
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
