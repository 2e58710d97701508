//! Schema Module
//!
//! Ordered, name-unique column list of a table.
//!
//! ## Row Layout
//! ```text
//! ┌───────────────┬──────────┬──────────┬─────┬──────────┬─────────────────┐
//! │ Tombstone (1) │ Col 1    │ Col 2    │ ... │ Col N    │ Flexible bytes  │
//! │               │ (fixed)  │ (fixed)  │     │ (fixed)  │ (dynamic only)  │
//! └───────────────┴──────────┴──────────┴─────┴──────────┴─────────────────┘
//! ```
//!
//! Fixed columns sit at offsets known from the schema alone (prefix sums of
//! the column widths). Flexible columns contribute no fixed width.

mod column;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Result, TableError};

pub use column::{ColumnDescriptor, ColumnKind};

/// Width of the tombstone byte that leads every row
pub const TOMBSTONE_WIDTH: usize = 1;

/// Largest fixed row width (tombstone included) a schema may declare
pub const MAX_ROW_WIDTH: usize = 1 << 30;

/// Validated column list with precomputed offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnDescriptor>", into = "Vec<ColumnDescriptor>")]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
    /// Offset of each column from the start of the row (tombstone included)
    offsets: Vec<usize>,
    /// Byte width of each column (0 for flexible strings)
    widths: Vec<usize>,
    fixed_width: usize,
    flexible_count: usize,
}

impl Schema {
    /// Validate the columns and compute the row layout
    ///
    /// Fails on an empty column list, a duplicate name, an invalid size or a
    /// fixed row wider than [`MAX_ROW_WIDTH`].
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self> {
        if columns.is_empty() {
            return Err(TableError::Schema("schema has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        let mut offsets = Vec::with_capacity(columns.len());
        let mut widths = Vec::with_capacity(columns.len());
        let mut offset = TOMBSTONE_WIDTH;
        let mut flexible_count = 0;

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::Schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            let width = codec::width_of(column)?;
            if column.is_flexible() {
                flexible_count += 1;
            }
            offsets.push(offset);
            widths.push(width);
            offset = offset
                .checked_add(width)
                .filter(|&end| end <= MAX_ROW_WIDTH)
                .ok_or_else(|| {
                    TableError::Schema(format!(
                        "column '{}' makes the row wider than {} bytes",
                        column.name, MAX_ROW_WIDTH
                    ))
                })?;
        }

        Ok(Self {
            columns,
            offsets,
            widths,
            fixed_width: offset - TOMBSTONE_WIDTH,
            flexible_count,
        })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Sum of the fixed column widths
    pub fn fixed_width(&self) -> usize {
        self.fixed_width
    }

    /// Fixed part of a row: tombstone plus every fixed column
    pub fn row_width(&self) -> usize {
        self.fixed_width + TOMBSTONE_WIDTH
    }

    pub fn flexible_count(&self) -> usize {
        self.flexible_count
    }

    /// Fixed columns with their offset and width inside the row
    pub fn fixed_columns(&self) -> impl Iterator<Item = (&ColumnDescriptor, usize, usize)> {
        self.columns
            .iter()
            .zip(self.offsets.iter().zip(self.widths.iter()))
            .filter(|(c, _)| !c.is_flexible())
            .map(|(c, (&offset, &width))| (c, offset, width))
    }

    /// Flexible columns in schema order
    pub fn flexible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_flexible())
    }

    /// Reject flexible columns, which need the dynamic engine's index
    pub fn require_fixed_width(&self) -> Result<()> {
        match self.flexible_columns().next() {
            Some(column) => Err(TableError::Schema(format!(
                "column '{}' has size 0, only allowed in dynamic tables",
                column.name
            ))),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a config file body. Unknown kinds and malformed JSON are
    /// reported as schema errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let columns: Vec<ColumnDescriptor> = serde_json::from_str(json)
            .map_err(|e| TableError::Schema(format!("invalid column list: {}", e)))?;
        Schema::new(columns)
    }

    /// Load a schema from its config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl TryFrom<Vec<ColumnDescriptor>> for Schema {
    type Error = TableError;

    fn try_from(columns: Vec<ColumnDescriptor>) -> Result<Self> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<ColumnDescriptor> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}
