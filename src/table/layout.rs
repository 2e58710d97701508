//! Row images
//!
//! Encodes a [`Row`] into the exact bytes written for it, and decodes those
//! bytes back. Both engines share this layout; the static engine simply never
//! has flexible columns.

use bytes::{BufMut, BytesMut};

use crate::codec;
use crate::error::{Result, TableError};
use crate::row::Row;
use crate::schema::Schema;

/// Leading liveness byte of every row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tombstone {
    Deleted = 0,
    Normal = 1,
}

impl Tombstone {
    /// Any byte other than `Deleted` marks a live row
    pub fn from_byte(byte: u8) -> Self {
        if byte == Tombstone::Deleted as u8 {
            Tombstone::Deleted
        } else {
            Tombstone::Normal
        }
    }
}

/// Encoded row, ready to be written at its offset
#[derive(Debug)]
pub(crate) struct RowImage {
    /// Tombstone, fixed columns, then flexible column bytes
    pub bytes: BytesMut,
    /// Byte length of each flexible column, in schema order
    pub flexible_lengths: Vec<u64>,
}

/// Encode every column of `row` in schema order
///
/// Nothing is written by this step, so a value that fails to encode leaves
/// the table untouched. Unknown columns in `row` are ignored.
pub(crate) fn encode_row(schema: &Schema, row: &Row) -> Result<RowImage> {
    let mut bytes = BytesMut::with_capacity(schema.row_width());
    bytes.put_u8(Tombstone::Normal as u8);

    for (column, _, _) in schema.fixed_columns() {
        match row.get(&column.name) {
            Some(value) => bytes.put_slice(&codec::encode(column, value)?),
            None => bytes.put_slice(&codec::zero_value_bytes(column)?),
        }
    }

    let mut flexible_lengths = Vec::with_capacity(schema.flexible_count());
    for column in schema.flexible_columns() {
        let encoded = match row.get(&column.name) {
            Some(value) => codec::encode(column, value)?,
            None => codec::zero_value_bytes(column)?,
        };
        flexible_lengths.push(encoded.len() as u64);
        bytes.put_slice(&encoded);
    }

    Ok(RowImage {
        bytes,
        flexible_lengths,
    })
}

/// Decode the fixed columns from a buffer that starts at the tombstone byte
pub(crate) fn decode_fixed(schema: &Schema, buf: &[u8], row: &mut Row) -> Result<()> {
    for (column, offset, width) in schema.fixed_columns() {
        let bytes = buf.get(offset..offset + width).ok_or_else(|| {
            TableError::MalformedValue(format!("row too short for column '{}'", column.name))
        })?;
        row.insert(column.name.clone(), codec::decode(column, bytes)?);
    }
    Ok(())
}

/// Decode the flexible columns that follow the fixed part of a row
pub(crate) fn decode_flexible(
    schema: &Schema,
    buf: &[u8],
    lengths: &[u64],
    row: &mut Row,
) -> Result<()> {
    let mut offset = schema.row_width();
    for (column, &length) in schema.flexible_columns().zip(lengths) {
        let bytes = usize::try_from(length)
            .ok()
            .and_then(|length| offset.checked_add(length))
            .and_then(|end| buf.get(offset..end))
            .ok_or_else(|| {
                TableError::MalformedValue(format!("row too short for column '{}'", column.name))
            })?;
        row.insert(column.name.clone(), codec::decode(column, bytes)?);
        offset += bytes.len();
    }
    Ok(())
}
