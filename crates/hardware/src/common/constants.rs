//! Constants shared by the cache and alignment models.

/// Width of a cache address in bits.
pub const ADDR_BITS: u32 = 32;

/// Widest single transfer between a client and the cache, in bytes (128-bit data field).
pub const MAX_ACCESS_BYTES: usize = 16;

/// Symbols packed into one 32-bit sequence word (2 bits per symbol).
pub const SYMBOLS_PER_WORD: usize = 16;

/// Bits used per packed nucleotide symbol.
pub const SYMBOL_BITS: u32 = 2;

/// Mask selecting one packed symbol.
pub const SYMBOL_MASK: u32 = 0x3;
