//! Sub-word read and write data units.
//!
//! A cache line is stored as raw bytes. These helpers pull a `len`-byte value
//! out of a line at a byte offset, and merge a value back in under a byte-enable
//! mask, leaving the other bytes of the line untouched. Byte order is
//! little-endian: the byte at `offset` is the least-significant byte of the value.
//!
//! Supported lengths are 1, 2, 4, 8, and 16 bytes. A request that would run off
//! the end of the line is rejected with [`CacheError::Range`] before any byte
//! is touched.

use crate::common::CacheError;
use crate::common::constants::MAX_ACCESS_BYTES;

/// Validates a sub-word request against a line of `line_bytes` bytes.
///
/// # Errors
///
/// Returns [`CacheError::InvalidLength`] for lengths other than 1, 2, 4, 8, or 16
/// and [`CacheError::Range`] when `offset + len > line_bytes`.
pub fn check_access(offset: usize, len: usize, line_bytes: usize) -> Result<(), CacheError> {
    if !len.is_power_of_two() || len > MAX_ACCESS_BYTES {
        return Err(CacheError::InvalidLength(len));
    }
    if offset + len > line_bytes {
        return Err(CacheError::Range {
            offset,
            len,
            line_bytes,
        });
    }
    Ok(())
}

/// Reads `len` bytes at `offset` of `line` as a little-endian integer.
///
/// # Errors
///
/// See [`check_access`].
pub fn read_data(line: &[u8], offset: usize, len: usize) -> Result<u128, CacheError> {
    check_access(offset, len, line.len())?;
    Ok(line[offset..offset + len]
        .iter()
        .rev()
        .fold(0u128, |acc, &b| (acc << 8) | u128::from(b)))
}

/// Writes the low `len` bytes of `value` into `line` at `offset` and returns
/// the byte-enable mask of the write.
///
/// # Errors
///
/// See [`check_access`]. On error the line is unchanged.
pub fn write_data(line: &mut [u8], offset: usize, len: usize, value: u128) -> Result<u16, CacheError> {
    check_access(offset, len, line.len())?;
    for (i, byte) in line[offset..offset + len].iter_mut().enumerate() {
        *byte = (value >> (8 * i)) as u8;
    }
    Ok(write_byte_enable(offset, len))
}

/// Byte-enable mask for a write of `len` bytes at `offset` into a 16-byte line.
///
/// Bit `i` is set when byte `i` of the line is written. Out-of-range bytes
/// are dropped from the mask.
pub const fn write_byte_enable(offset: usize, len: usize) -> u16 {
    if offset >= MAX_ACCESS_BYTES || len == 0 {
        return 0;
    }
    let bits = if len >= MAX_ACCESS_BYTES {
        u16::MAX
    } else {
        (1u16 << len) - 1
    };
    bits << offset
}

/// Extracts `len` bytes at `offset` from a 128-bit line.
///
/// # Errors
///
/// See [`check_access`].
pub fn extract(line: u128, offset: usize, len: usize) -> Result<u128, CacheError> {
    read_data(&line.to_le_bytes(), offset, len)
}

/// Inserts the low `len` bytes of `value` into a 128-bit line at `offset`.
///
/// # Errors
///
/// See [`check_access`].
pub fn insert(line: u128, offset: usize, len: usize, value: u128) -> Result<u128, CacheError> {
    let mut bytes = line.to_le_bytes();
    let _ = write_data(&mut bytes, offset, len, value)?;
    Ok(u128::from_le_bytes(bytes))
}
