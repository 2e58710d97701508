//! Dynamic Table Engine
//!
//! Rows have no common stride, so a second file records where each row
//! starts and how long its flexible columns are.
//!
//! ## Data File
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header: Version varint (= 2), 10 bytes                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ [Tombstone][Fixed cols...][Flex 1 bytes]...[Flex K]     │
//! │ ... rows appended at the append pointer ...             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Index File
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Version varint (= 3), 10 bytes                          │
//! │ Append pointer varint, 10 bytes                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Slot 0  [Data offset][Flex 1 len]...[Flex K len]        │
//! │ Slot 1  ...                                             │
//! │ (10 bytes per field, K + 1 fields per slot)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The append pointer is the next free data-file offset. It is rewritten
//! after every row, since row lengths cannot be recovered from the data file.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace, warn};

use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::config::{Config, TablePaths};
use crate::error::{Result, TableError};
use crate::row::Row;
use crate::schema::Schema;

use super::file::{ensure_absent, TableFile, HEADER_WIDTH};
use super::layout::{self, Tombstone};
use super::{check_bounds, save_schema, RowStore, RowTarget};

/// Format version of a dynamic data file
pub const DYNAMIC_TABLE_VERSION: i64 = 2;

/// Format version of a dynamic index file
pub const DYNAMIC_INDEX_VERSION: i64 = 3;

/// Index offset of the append pointer slot
const APPEND_POINTER_OFFSET: u64 = HEADER_WIDTH;

/// Index bytes before slot 0: version + append pointer
const INDEX_HEADER_WIDTH: u64 = HEADER_WIDTH + MAX_VARINT_LEN as u64;

/// Where one row lives in the data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute offset of the row's tombstone byte
    pub offset: u64,
    /// Byte length of each flexible column, in schema order
    pub flexible_lengths: Vec<u64>,
}

impl IndexEntry {
    /// Total bytes the row occupies in the data file
    ///
    /// Saturates instead of overflowing, so a corrupt slot reports a length
    /// no data file can hold.
    pub fn row_len(&self, schema: &Schema) -> u64 {
        self.flexible_lengths
            .iter()
            .fold(schema.row_width() as u64, |len, &flex| len.saturating_add(flex))
    }
}

/// Variable-width row table backed by a data file and an index file
#[derive(Debug)]
pub struct DynamicTable {
    paths: TablePaths,
    schema: Schema,
    data: TableFile,
    index: TableFile,
}

impl DynamicTable {
    /// Create the config, data and index files
    pub fn create(config: &Config, paths: TablePaths, schema: Schema) -> Result<Self> {
        ensure_absent(&[&paths.config, &paths.index, &paths.data])?;

        save_schema(&paths.config, &schema, config)?;

        let mut data = TableFile::create(&paths.data, config)?;
        data.write_slot(0, DYNAMIC_TABLE_VERSION)?;
        data.sync()?;

        let mut index = TableFile::create(&paths.index, config)?;
        index.write_slot(0, DYNAMIC_INDEX_VERSION)?;
        index.write_slot(APPEND_POINTER_OFFSET, HEADER_WIDTH as i64)?;
        index.sync()?;

        debug!(
            path = %paths.data.display(),
            flexible_columns = schema.flexible_count(),
            "created dynamic table"
        );

        Ok(Self {
            paths,
            schema,
            data,
            index,
        })
    }

    /// Open an existing table, validating schema and both headers
    pub fn open(config: &Config, paths: TablePaths) -> Result<Self> {
        let schema = Schema::load(&paths.config)?;

        let mut data = TableFile::open(&paths.data, config)?;
        data.expect_version("table", DYNAMIC_TABLE_VERSION)?;

        let mut index = TableFile::open(&paths.index, config)?;
        index.expect_version("index", DYNAMIC_INDEX_VERSION)?;

        let mut table = Self {
            paths,
            schema,
            data,
            index,
        };

        let append_offset = table.append_offset()?;
        let data_len = table.data.len()?;
        if append_offset > data_len {
            warn!(
                path = %table.paths.data.display(),
                append_offset,
                data_len,
                "append pointer is past the end of the table file"
            );
        }

        let rows = table.row_count()?;
        debug!(
            path = %table.paths.data.display(),
            rows,
            append_offset,
            "opened dynamic table"
        );
        Ok(table)
    }

    /// Release both file handles. Writes are already durable.
    pub fn close(self) -> Result<()> {
        debug!(path = %self.paths.data.display(), "closed dynamic table");
        Ok(())
    }

    pub fn paths(&self) -> &TablePaths {
        &self.paths
    }

    /// Next free offset in the data file
    pub fn append_offset(&mut self) -> Result<u64> {
        let offset = self.index.read_slot(APPEND_POINTER_OFFSET)?;
        u64::try_from(offset)
            .map_err(|_| TableError::MalformedValue(format!("negative append pointer {}", offset)))
    }

    /// Read the index slot of a row
    pub fn index_entry(&mut self, row_number: i64) -> Result<IndexEntry> {
        check_bounds(row_number, self.row_count()?)?;

        let mut slot = vec![0u8; self.slot_width() as usize];
        self.index.read_at(self.slot_offset(row_number), &mut slot)?;

        let mut fields = slot.chunks_exact(MAX_VARINT_LEN).map(|field| {
            varint::read_varint(field)
                .and_then(|(v, _)| u64::try_from(v).ok())
                .ok_or_else(|| {
                    TableError::MalformedValue(format!("corrupt index slot for row {}", row_number))
                })
        });

        let offset = match fields.next() {
            Some(field) => field?,
            None => {
                return Err(TableError::MalformedValue(format!(
                    "empty index slot for row {}",
                    row_number
                )))
            }
        };
        let flexible_lengths = fields.collect::<Result<Vec<u64>>>()?;

        Ok(IndexEntry {
            offset,
            flexible_lengths,
        })
    }

    /// Index entry and row length, checked against the data file length
    fn located_entry(&mut self, row_number: i64) -> Result<(IndexEntry, u64)> {
        let entry = self.index_entry(row_number)?;
        let row_len = entry.row_len(&self.schema);

        let data_len = self.data.len()?;
        if entry.offset.checked_add(row_len).map_or(true, |end| end > data_len) {
            return Err(TableError::MalformedValue(format!(
                "index slot for row {} points past the end of the table file ({} + {} > {})",
                row_number, entry.offset, row_len, data_len
            )));
        }
        Ok((entry, row_len))
    }

    // =========================================================================
    // Offset Arithmetic
    // =========================================================================

    /// One offset field plus one length field per flexible column
    fn slot_width(&self) -> u64 {
        MAX_VARINT_LEN as u64 * (self.schema.flexible_count() as u64 + 1)
    }

    fn slot_offset(&self, row_number: i64) -> u64 {
        INDEX_HEADER_WIDTH + row_number as u64 * self.slot_width()
    }

    fn encode_slot(offset: u64, lengths: &[u64]) -> BytesMut {
        let mut slot = BytesMut::with_capacity(MAX_VARINT_LEN * (lengths.len() + 1));
        slot.put_slice(&varint::varint_slot(offset as i64));
        for &length in lengths {
            slot.put_slice(&varint::varint_slot(length as i64));
        }
        slot
    }
}

impl RowStore for DynamicTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of index slots, deleted rows included
    fn row_count(&mut self) -> Result<i64> {
        let body = self.index.len()?.saturating_sub(INDEX_HEADER_WIDTH);
        Ok((body / self.slot_width()) as i64)
    }

    /// Append a row, or re-point an existing row number at a freshly appended
    /// image. Row bytes are never overwritten in place.
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

        let offset = self.append_offset()?;
        let next_offset = offset + image.bytes.len() as u64;

        self.data.write_at(offset, &image.bytes)?;

        let slot = Self::encode_slot(offset, &image.flexible_lengths);
        self.index.write_at(self.slot_offset(row_number), &slot)?;
        self.index
            .write_slot(APPEND_POINTER_OFFSET, next_offset as i64)?;

        self.data.sync()?;
        self.index.sync()?;

        trace!(row = row_number, offset, len = image.bytes.len(), ?target, "wrote dynamic row");
        Ok(row_number)
    }

    fn read_row(&mut self, row_number: i64) -> Result<Row> {
        let (entry, row_len) = self.located_entry(row_number)?;

        let mut buf = vec![0u8; row_len as usize];
        self.data.read_at(entry.offset, &mut buf)?;

        if Tombstone::from_byte(buf[0]) == Tombstone::Deleted {
            return Err(TableError::RowDeleted(row_number));
        }

        let mut row = Row::new();
        layout::decode_fixed(&self.schema, &buf, &mut row)?;
        layout::decode_flexible(&self.schema, &buf, &entry.flexible_lengths, &mut row)?;
        Ok(row)
    }

    /// Mark the row deleted in the data file; its index slot stays in place
    fn delete_row(&mut self, row_number: i64) -> Result<()> {
        let (entry, _) = self.located_entry(row_number)?;

        self.data.write_at(entry.offset, &[Tombstone::Deleted as u8])?;
        self.data.sync()?;

        trace!(row = row_number, offset = entry.offset, "deleted dynamic row");
        Ok(())
    }
}
