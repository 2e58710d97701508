//! Signed varint encoding
//!
//! Zig-zag mapped LEB128: seven payload bits per byte, high bit set on every
//! byte except the last. A 64-bit value never needs more than
//! [`MAX_VARINT_LEN`] bytes, and every on-disk slot that holds a varint
//! reserves exactly that many, zero padded.

/// Maximum encoded width of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

/// Encode an unsigned value into `buf`, returning the number of bytes written.
///
/// `buf` must have at least [`MAX_VARINT_LEN`] bytes available.
pub fn put_uvarint(buf: &mut [u8], mut value: u64) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Encode a signed value into `buf`, returning the number of bytes written.
pub fn put_varint(buf: &mut [u8], value: i64) -> usize {
    let mut zigzag = (value as u64) << 1;
    if value < 0 {
        zigzag = !zigzag;
    }
    put_uvarint(buf, zigzag)
}

/// Decode an unsigned varint from the front of `buf`.
///
/// Returns `None` when the buffer ends mid-value or the encoding overflows
/// 64 bits.
pub fn read_uvarint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return None;
        }
        if byte < 0x80 {
            // Tenth byte may only carry the single remaining bit
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return None;
            }
            return Some((value | (u64::from(byte) << shift), i + 1));
        }
        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;
    }

    None
}

/// Decode a signed varint from the front of `buf`.
pub fn read_varint(buf: &[u8]) -> Option<(i64, usize)> {
    let (zigzag, len) = read_uvarint(buf)?;
    let mut value = (zigzag >> 1) as i64;
    if zigzag & 1 != 0 {
        value = !value;
    }
    Some((value, len))
}

/// Encode a signed value into a full, zero-padded slot
pub fn varint_slot(value: i64) -> [u8; MAX_VARINT_LEN] {
    let mut slot = [0u8; MAX_VARINT_LEN];
    put_varint(&mut slot, value);
    slot
}
