//! Cache address decomposition.
//!
//! This module slices 32-bit byte addresses into the fields a set-associative
//! cache indexes by. It provides the following:
//! 1. **Layout:** Bit widths of the offset, bank, and index fields for a given geometry.
//! 2. **Splitting:** Extraction of `(tag, index, offset)` from a raw address.
//! 3. **Composition:** Reconstruction of line-aligned addresses from a tag and index.
//!
//! Fields are taken least-significant first: `offset`, then `bank` (zero bits in
//! every supported configuration), then `index`, with the tag occupying the
//! remaining high bits up to bit 31.

use super::constants::ADDR_BITS;

/// Fields of a decomposed cache address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheAddr {
    /// High-order bits identifying which line occupies a slot.
    pub tag: u32,
    /// Set index.
    pub index: usize,
    /// Byte offset within the line.
    pub offset: usize,
}

/// Bit layout of a cache address for one cache geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrLayout {
    offset_bits: u32,
    bank_bits: u32,
    index_bits: u32,
}

impl AddrLayout {
    /// Creates a layout for `line_bytes`-byte lines spread across `num_sets` sets.
    ///
    /// Both arguments must be powers of two; the caller (configuration
    /// validation) is responsible for checking that.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Cache line size in bytes.
    /// * `num_sets` - Number of sets.
    pub fn new(line_bytes: usize, num_sets: usize) -> Self {
        Self {
            offset_bits: line_bytes.trailing_zeros(),
            bank_bits: 0,
            index_bits: num_sets.trailing_zeros(),
        }
    }

    /// Number of offset bits.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of index bits.
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Bit position where the tag starts.
    #[inline]
    pub const fn tag_start(&self) -> u32 {
        self.offset_bits + self.bank_bits + self.index_bits
    }

    /// Splits `addr` into tag, set index, and line offset.
    ///
    /// Bank bits are skipped; they never influence hit/miss behaviour.
    #[inline]
    pub fn split(&self, addr: u32) -> CacheAddr {
        let offset = addr & low_mask(self.offset_bits);
        let idx_start = self.offset_bits + self.bank_bits;
        let index = (addr >> idx_start) & low_mask(self.index_bits);
        let tag_start = self.tag_start();
        let tag = if tag_start >= ADDR_BITS {
            0
        } else {
            addr >> tag_start
        };
        CacheAddr {
            tag,
            index: index as usize,
            offset: offset as usize,
        }
    }

    /// Returns the address of the first byte of the line containing `addr`.
    #[inline]
    pub fn line_base(&self, addr: u32) -> u32 {
        addr & !low_mask(self.offset_bits)
    }

    /// Rebuilds the line-aligned address of the line with `tag` in set `index`.
    pub fn compose(&self, tag: u32, index: usize) -> u32 {
        let tag_start = self.tag_start();
        let tag_part = if tag_start >= ADDR_BITS {
            0
        } else {
            tag << tag_start
        };
        tag_part | ((index as u32) << (self.offset_bits + self.bank_bits))
    }
}

#[inline]
const fn low_mask(bits: u32) -> u32 {
    if bits >= ADDR_BITS {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}
