//! Column Codec Module
//!
//! Byte widths and encode/decode rules for every column kind.
//!
//! ## Column Encodings
//! ```text
//! ┌───────────┬────────────┬──────────────────────────────────────────┐
//! │ Kind      │ Width      │ Encoding                                 │
//! ├───────────┼────────────┼──────────────────────────────────────────┤
//! │ int64     │ 10         │ zig-zag varint, zero padded              │
//! │ float64   │ 8          │ IEEE-754, little-endian                  │
//! │ string    │ size       │ raw bytes, zero padded                   │
//! │ string(0) │ per row    │ raw bytes, length kept in the index      │
//! │ time      │ 15         │ see `timestamp`                          │
//! └───────────┴────────────┴──────────────────────────────────────────┘
//! ```

pub mod timestamp;
pub mod varint;

use crate::error::{Result, TableError};
use crate::row::Value;
use crate::schema::{ColumnDescriptor, ColumnKind};

pub use timestamp::TIMESTAMP_WIDTH;
pub use varint::MAX_VARINT_LEN;

/// Width of a float64 column
pub const FLOAT64_WIDTH: usize = 8;

/// Byte width of a column. Flexible strings report 0.
pub fn width_of(column: &ColumnDescriptor) -> Result<usize> {
    match column.kind {
        ColumnKind::Int64 => Ok(MAX_VARINT_LEN),
        ColumnKind::Float64 => Ok(FLOAT64_WIDTH),
        ColumnKind::Timestamp => Ok(TIMESTAMP_WIDTH),
        ColumnKind::String => usize::try_from(column.size).map_err(|_| {
            TableError::Schema(format!(
                "column '{}' has invalid size {}",
                column.name, column.size
            ))
        }),
    }
}

/// Canonical encoding of an unset column
pub fn zero_value_bytes(column: &ColumnDescriptor) -> Result<Vec<u8>> {
    let width = width_of(column)?;
    let bytes = match column.kind {
        ColumnKind::Int64 => varint::varint_slot(0).to_vec(),
        ColumnKind::Float64 => 0.0f64.to_le_bytes().to_vec(),
        ColumnKind::String => vec![0u8; width],
        ColumnKind::Timestamp => timestamp::ZERO_TIMESTAMP.to_vec(),
    };
    Ok(bytes)
}

/// Encode `value` for `column`
///
/// The result is exactly `width_of(column)` bytes, except for flexible
/// strings where it is the string's own length.
pub fn encode(column: &ColumnDescriptor, value: &Value) -> Result<Vec<u8>> {
    let width = width_of(column)?;

    match (column.kind, value) {
        (ColumnKind::Int64, Value::Int64(v)) => Ok(varint::varint_slot(*v).to_vec()),
        (ColumnKind::Float64, Value::Float64(v)) => Ok(v.to_le_bytes().to_vec()),
        (ColumnKind::String, Value::String(s)) => {
            if column.is_flexible() {
                return Ok(s.as_bytes().to_vec());
            }
            if s.len() > width {
                return Err(TableError::type_mismatch(
                    &column.name,
                    format!("string of {} bytes exceeds width {}", s.len(), width),
                ));
            }
            let mut bytes = vec![0u8; width];
            bytes[..s.len()].copy_from_slice(s.as_bytes());
            Ok(bytes)
        }
        (ColumnKind::Timestamp, Value::Timestamp(ts)) => timestamp::encode(ts)
            .map(|b| b.to_vec())
            .map_err(|detail| TableError::type_mismatch(&column.name, detail)),
        (kind, value) => Err(TableError::type_mismatch(
            &column.name,
            format!("expected {}, got {}", kind, value.kind()),
        )),
    }
}

/// Decode the bytes of one column
pub fn decode(column: &ColumnDescriptor, bytes: &[u8]) -> Result<Value> {
    match column.kind {
        ColumnKind::Int64 => varint::read_varint(bytes)
            .map(|(v, _)| Value::Int64(v))
            .ok_or_else(|| malformed(column, "invalid varint")),
        ColumnKind::Float64 => {
            let raw: [u8; FLOAT64_WIDTH] = bytes
                .get(..FLOAT64_WIDTH)
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| malformed(column, "truncated float"))?;
            Ok(Value::Float64(f64::from_le_bytes(raw)))
        }
        ColumnKind::String => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            let s = std::str::from_utf8(&bytes[..end])
                .map_err(|e| malformed(column, &e.to_string()))?;
            Ok(Value::String(s.to_string()))
        }
        ColumnKind::Timestamp => timestamp::decode(bytes)
            .map(Value::Timestamp)
            .map_err(|detail| malformed(column, &detail)),
    }
}

fn malformed(column: &ColumnDescriptor, detail: &str) -> TableError {
    TableError::MalformedValue(format!("column '{}': {}", column.name, detail))
}
