//! Column descriptors
//!
//! One typed field of a table, as persisted in the config file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value kinds a column can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    #[serde(rename = "int64")]
    Int64,

    #[serde(rename = "float64")]
    Float64,

    /// Zero-padded string; width 0 means flexible (dynamic tables only)
    #[serde(rename = "string")]
    String,

    #[serde(rename = "time")]
    Timestamp,
}

impl ColumnKind {
    /// Name used in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Int64 => "int64",
            ColumnKind::Float64 => "float64",
            ColumnKind::String => "string",
            ColumnKind::Timestamp => "time",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column
///
/// `size` is only meaningful for strings; other kinds have a fixed width and
/// ignore whatever size was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(alias = "Name")]
    pub name: String,

    #[serde(rename = "type", alias = "Type")]
    pub kind: ColumnKind,

    #[serde(alias = "Size", default)]
    pub size: i64,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, kind: ColumnKind, size: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Int64, 0)
    }

    pub fn float64(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Float64, 0)
    }

    /// Fixed-width string of `size` bytes
    pub fn string(name: impl Into<String>, size: i64) -> Self {
        Self::new(name, ColumnKind::String, size)
    }

    /// String whose width is decided per row (dynamic tables only)
    pub fn flexible_string(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::String, 0)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Timestamp, 0)
    }

    /// True for a string column declared with size 0
    pub fn is_flexible(&self) -> bool {
        self.kind == ColumnKind::String && self.size == 0
    }
}
