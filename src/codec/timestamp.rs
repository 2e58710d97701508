//! Timestamp binary form
//!
//! ## Layout (15 bytes, big-endian)
//! ```text
//! ┌─────────────┬──────────────────┬──────────────┬──────────────────┐
//! │ Version (1) │ Seconds (8)      │ Nanos (4)    │ Offset mins (2)  │
//! │    = 1      │ since 0001-01-01 │              │ -1 means UTC     │
//! └─────────────┴──────────────────┴──────────────┴──────────────────┘
//! ```

use bytes::Buf;
use chrono::{DateTime, FixedOffset, Utc};

/// Encoded width of a timestamp column
pub const TIMESTAMP_WIDTH: usize = 15;

const VERSION_V1: u8 = 1;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch
const SECONDS_BEFORE_UNIX_EPOCH: i64 = 62_135_596_800;

const UTC_OFFSET_MARKER: i16 = -1;

/// Encoding of 0001-01-01T00:00:00Z, the zero timestamp
pub const ZERO_TIMESTAMP: [u8; TIMESTAMP_WIDTH] =
    [VERSION_V1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF];

/// 0001-01-01T00:00:00Z, the value unset timestamp columns read back as
pub fn zero_timestamp() -> DateTime<FixedOffset> {
    DateTime::from_timestamp(-SECONDS_BEFORE_UNIX_EPOCH, 0)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .fixed_offset()
}

/// Encode a timestamp. Fails when the UTC offset has a seconds component.
pub fn encode(ts: &DateTime<FixedOffset>) -> Result<[u8; TIMESTAMP_WIDTH], String> {
    let offset_secs = ts.offset().local_minus_utc();
    if offset_secs % 60 != 0 {
        return Err(format!("offset of {}s is not a whole minute", offset_secs));
    }
    let offset_mins = match offset_secs / 60 {
        0 => UTC_OFFSET_MARKER,
        mins => mins as i16,
    };

    let seconds = ts.timestamp() + SECONDS_BEFORE_UNIX_EPOCH;
    let nanos = ts.timestamp_subsec_nanos() as i32;

    let mut out = [0u8; TIMESTAMP_WIDTH];
    out[0] = VERSION_V1;
    out[1..9].copy_from_slice(&seconds.to_be_bytes());
    out[9..13].copy_from_slice(&nanos.to_be_bytes());
    out[13..15].copy_from_slice(&offset_mins.to_be_bytes());
    Ok(out)
}

/// Decode a timestamp previously produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<DateTime<FixedOffset>, String> {
    if bytes.len() != TIMESTAMP_WIDTH {
        return Err(format!(
            "timestamp needs {} bytes, got {}",
            TIMESTAMP_WIDTH,
            bytes.len()
        ));
    }
    if bytes[0] != VERSION_V1 {
        return Err(format!("unsupported timestamp version {}", bytes[0]));
    }

    let mut fields = &bytes[1..];
    let seconds = fields.get_i64();
    let nanos = fields.get_i32();
    let offset_mins = fields.get_i16();

    let nanos = u32::try_from(nanos).map_err(|_| format!("negative nanoseconds {}", nanos))?;
    let offset_secs = match offset_mins {
        UTC_OFFSET_MARKER => 0,
        mins => i32::from(mins) * 60,
    };
    let offset = FixedOffset::east_opt(offset_secs)
        .ok_or_else(|| format!("offset of {} minutes out of range", offset_mins))?;

    let unix_seconds = seconds
        .checked_sub(SECONDS_BEFORE_UNIX_EPOCH)
        .ok_or_else(|| format!("seconds {} out of range", seconds))?;
    let instant = DateTime::from_timestamp(unix_seconds, nanos)
        .ok_or_else(|| format!("instant {}s+{}ns out of range", unix_seconds, nanos))?;

    Ok(instant.with_timezone(&offset))
}
