//! Table Module
//!
//! The two storage engines and the [`Table`] enum that selects between them.
//!
//! ## Responsibilities
//! - Create table files from a schema and reopen them later
//! - Append, overwrite, read and tombstone rows by row number
//! - Detect which engine a table was written by from its header
//!
//! ## Engines
//! - [`StaticTable`]: fixed stride rows, one data file
//! - [`DynamicTable`]: variable width rows located through an index file
//!
//! Neither engine reclaims space: deleted and superseded rows stay in the
//! data file until the table is dropped.

mod dynamic_table;
mod file;
mod layout;
mod static_table;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::config::{Config, TablePaths};
use crate::error::{Result, TableError};
use crate::query::{self, Condition, Statement};
use crate::row::Row;
use crate::schema::Schema;

pub use dynamic_table::{DynamicTable, IndexEntry, DYNAMIC_INDEX_VERSION, DYNAMIC_TABLE_VERSION};
pub use file::HEADER_WIDTH;
pub use layout::Tombstone;
pub use static_table::{StaticTable, STATIC_TABLE_VERSION};

/// Where `write_row` puts a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// After the last row
    Append,
    /// Replace an existing row
    At(i64),
}

/// Row-level operations shared by both engines
pub trait RowStore {
    fn schema(&self) -> &Schema;

    /// Number of row numbers in use, deleted rows included
    fn row_count(&mut self) -> Result<i64>;

    /// Write a row and return its row number
    fn write_row(&mut self, target: RowTarget, row: &Row) -> Result<i64>;

    fn read_row(&mut self, row_number: i64) -> Result<Row>;

    fn delete_row(&mut self, row_number: i64) -> Result<()>;
}

/// Which engine backs a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Static,
    Dynamic,
}

impl TableKind {
    /// Name recorded by table catalogs
    pub fn type_name(&self) -> &'static str {
        match self {
            TableKind::Static => "TableStatic",
            TableKind::Dynamic => "TableDynamic",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for TableKind {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "static" | "TableStatic" => Ok(TableKind::Static),
            "dynamic" | "TableDynamic" => Ok(TableKind::Dynamic),
            other => Err(TableError::Schema(format!("unknown table type '{}'", other))),
        }
    }
}

/// An open table of either kind
#[derive(Debug)]
pub enum Table {
    Static(StaticTable),
    Dynamic(DynamicTable),
}

impl Table {
    /// Create a new table called `name` in the configured data directory
    pub fn create(config: &Config, name: &str, kind: TableKind, schema: Schema) -> Result<Self> {
        if !config.data_dir.is_dir() {
            return Err(TableError::NotADirectory(config.data_dir.clone()));
        }

        let paths = config.table_paths(name);
        match kind {
            TableKind::Static => StaticTable::create(config, paths, schema).map(Table::Static),
            TableKind::Dynamic => DynamicTable::create(config, paths, schema).map(Table::Dynamic),
        }
    }

    /// Open the table called `name`, choosing the engine from the data file
    /// header
    pub fn open(config: &Config, name: &str) -> Result<Self> {
        let paths = config.table_paths(name);
        let kind = Self::detect_kind(config, &paths)?;
        debug!(table = name, %kind, "opening table");

        match kind {
            TableKind::Static => StaticTable::open(config, paths).map(Table::Static),
            TableKind::Dynamic => DynamicTable::open(config, paths).map(Table::Dynamic),
        }
    }

    fn detect_kind(config: &Config, paths: &TablePaths) -> Result<TableKind> {
        let mut data = file::TableFile::open(&paths.data, config)?;
        match data.version()? {
            STATIC_TABLE_VERSION => Ok(TableKind::Static),
            DYNAMIC_TABLE_VERSION => Ok(TableKind::Dynamic),
            found => Err(TableError::VersionMismatch {
                file: "table",
                found,
            }),
        }
    }

    /// Release the underlying files
    pub fn close(self) -> Result<()> {
        match self {
            Table::Static(t) => t.close(),
            Table::Dynamic(t) => t.close(),
        }
    }

    pub fn kind(&self) -> TableKind {
        match self {
            Table::Static(_) => TableKind::Static,
            Table::Dynamic(_) => TableKind::Dynamic,
        }
    }

    pub fn paths(&self) -> &TablePaths {
        match self {
            Table::Static(t) => t.paths(),
            Table::Dynamic(t) => t.paths(),
        }
    }

    /// Append a row
    pub fn insert(&mut self, row: &Row) -> Result<i64> {
        self.write_row(RowTarget::Append, row)
    }

    /// Replace the row at `row_number`
    pub fn update(&mut self, row_number: i64, row: &Row) -> Result<i64> {
        self.write_row(RowTarget::At(row_number), row)
    }

    /// Live rows matching every condition
    pub fn scan(&mut self, conditions: &[Condition]) -> Result<BTreeMap<i64, Row>> {
        query::scan(self, conditions)
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<BTreeMap<i64, Row>> {
        query::execute(self, statement)
    }
}

impl RowStore for Table {
    fn schema(&self) -> &Schema {
        match self {
            Table::Static(t) => t.schema(),
            Table::Dynamic(t) => t.schema(),
        }
    }

    fn row_count(&mut self) -> Result<i64> {
        match self {
            Table::Static(t) => t.row_count(),
            Table::Dynamic(t) => t.row_count(),
        }
    }

    fn write_row(&mut self, target: RowTarget, row: &Row) -> Result<i64> {
        match self {
            Table::Static(t) => t.write_row(target, row),
            Table::Dynamic(t) => t.write_row(target, row),
        }
    }

    fn read_row(&mut self, row_number: i64) -> Result<Row> {
        match self {
            Table::Static(t) => t.read_row(row_number),
            Table::Dynamic(t) => t.read_row(row_number),
        }
    }

    fn delete_row(&mut self, row_number: i64) -> Result<()> {
        match self {
            Table::Static(t) => t.delete_row(row_number),
            Table::Dynamic(t) => t.delete_row(row_number),
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Fail with `OutOfRange` unless `0 <= row_number < count`
pub(crate) fn check_bounds(row_number: i64, count: i64) -> Result<()> {
    if row_number < 0 || row_number >= count {
        return Err(TableError::OutOfRange {
            row: row_number,
            count,
        });
    }
    Ok(())
}

/// Write the schema sidecar file
pub(crate) fn save_schema(path: &Path, schema: &Schema, config: &Config) -> Result<()> {
    let json = schema.to_json()?;
    let mut file = file::create_new(path, config.file_mode)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
