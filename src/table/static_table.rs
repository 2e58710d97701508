//! Static Table Engine
//!
//! Every row occupies the same stride, so a row number maps straight to a
//! file offset.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (10 bytes)                                       │
//! │   Version: varint (= 1), zero padded                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Row 0   [Tombstone (1)][Col 1]...[Col N]                │
//! │ Row 1   [Tombstone (1)][Col 1]...[Col N]                │
//! │ ... (row_width bytes each)                              │
//! └─────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, trace, warn};

use crate::config::{Config, TablePaths};
use crate::error::{Result, TableError};
use crate::row::Row;
use crate::schema::Schema;

use super::file::{ensure_absent, TableFile, HEADER_WIDTH};
use super::layout::{self, Tombstone};
use super::{check_bounds, save_schema, RowStore, RowTarget};

/// Format version of a static data file
pub const STATIC_TABLE_VERSION: i64 = 1;

/// Fixed-width row table backed by a single data file
#[derive(Debug)]
pub struct StaticTable {
    paths: TablePaths,
    schema: Schema,
    data: TableFile,
}

impl StaticTable {
    /// Create the config and data files
    ///
    /// Fails if either file already exists or the schema has flexible columns.
    pub fn create(config: &Config, paths: TablePaths, schema: Schema) -> Result<Self> {
        schema.require_fixed_width()?;
        ensure_absent(&[&paths.config, &paths.data])?;

        save_schema(&paths.config, &schema, config)?;

        let mut data = TableFile::create(&paths.data, config)?;
        data.write_slot(0, STATIC_TABLE_VERSION)?;
        data.sync()?;

        debug!(
            path = %paths.data.display(),
            row_width = schema.row_width(),
            "created static table"
        );

        Ok(Self {
            paths,
            schema,
            data,
        })
    }

    /// Open an existing table, validating schema and header
    pub fn open(config: &Config, paths: TablePaths) -> Result<Self> {
        let schema = Schema::load(&paths.config)?;
        schema.require_fixed_width()?;

        let mut data = TableFile::open(&paths.data, config)?;
        data.expect_version("table", STATIC_TABLE_VERSION)?;

        let mut table = Self {
            paths,
            schema,
            data,
        };

        let trailing = table.body_len()? % table.row_width();
        if trailing != 0 {
            warn!(
                path = %table.paths.data.display(),
                trailing_bytes = trailing,
                "ignoring partial row at end of table file"
            );
        }

        let rows = table.row_count()?;
        debug!(
            path = %table.paths.data.display(),
            rows,
            "opened static table"
        );
        Ok(table)
    }

    /// Release the file handle. Writes are already durable.
    pub fn close(self) -> Result<()> {
        debug!(path = %self.paths.data.display(), "closed static table");
        Ok(())
    }

    pub fn paths(&self) -> &TablePaths {
        &self.paths
    }

    // =========================================================================
    // Offset Arithmetic
    // =========================================================================

    fn row_width(&self) -> u64 {
        self.schema.row_width() as u64
    }

    fn body_len(&self) -> Result<u64> {
        Ok(self.data.len()?.saturating_sub(HEADER_WIDTH))
    }

    fn row_offset(&self, row_number: i64) -> u64 {
        HEADER_WIDTH + row_number as u64 * self.row_width()
    }
}

impl RowStore for StaticTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of complete rows, deleted ones included
    fn row_count(&mut self) -> Result<i64> {
        Ok((self.body_len()? / self.row_width()) as i64)
    }

    /// Append a row or overwrite one in place
    fn write_row(&mut self, target: RowTarget, row: &Row) -> Result<i64> {
        let image = layout::encode_row(&self.schema, row)?;

        let count = self.row_count()?;
        let row_number = match target {
            RowTarget::Append => count,
            RowTarget::At(n) => {
                check_bounds(n, count)?;
                n
            }
        };

        self.data.write_at(self.row_offset(row_number), &image.bytes)?;
        self.data.sync()?;

        trace!(row = row_number, ?target, "wrote static row");
        Ok(row_number)
    }

    fn read_row(&mut self, row_number: i64) -> Result<Row> {
        check_bounds(row_number, self.row_count()?)?;

        let mut buf = vec![0u8; self.schema.row_width()];
        self.data.read_at(self.row_offset(row_number), &mut buf)?;

        if Tombstone::from_byte(buf[0]) == Tombstone::Deleted {
            return Err(TableError::RowDeleted(row_number));
        }

        let mut row = Row::new();
        layout::decode_fixed(&self.schema, &buf, &mut row)?;
        Ok(row)
    }

    /// Overwrite only the tombstone byte. The row's space is never reused.
    fn delete_row(&mut self, row_number: i64) -> Result<()> {
        check_bounds(row_number, self.row_count()?)?;

        self.data
            .write_at(self.row_offset(row_number), &[Tombstone::Deleted as u8])?;
        self.data.sync()?;

        trace!(row = row_number, "deleted static row");
        Ok(())
    }
}
