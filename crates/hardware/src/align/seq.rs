//! Nucleotide symbols and packed sequence words.
//!
//! Symbols are 2-bit codes (`A=0`, `C=1`, `G=2`, `T=3`). A packed word holds
//! sixteen of them, symbol `i` at bits `2i..2i+2`, so the first symbol is the
//! least-significant pair.

use crate::common::ExtendError;
use crate::common::constants::{SYMBOL_BITS, SYMBOL_MASK, SYMBOLS_PER_WORD};

/// Maps an ASCII nucleotide (either case) to its 2-bit code.
pub const fn encode_base(base: char) -> Option<u8> {
    match base {
        'A' | 'a' => Some(0),
        'C' | 'c' => Some(1),
        'G' | 'g' => Some(2),
        'T' | 't' => Some(3),
        _ => None,
    }
}

/// Maps a 2-bit code back to its upper-case nucleotide. Only the low two bits are used.
pub const fn decode_base(symbol: u8) -> char {
    match symbol & SYMBOL_MASK as u8 {
        0 => 'A',
        1 => 'C',
        2 => 'G',
        _ => 'T',
    }
}

/// Encodes an ASCII sequence into symbols.
///
/// # Errors
///
/// Returns [`ExtendError::InvalidBase`] at the first character outside `ACGTacgt`.
pub fn encode(seq: &str) -> Result<Vec<u8>, ExtendError> {
    seq.chars()
        .map(|c| encode_base(c).ok_or(ExtendError::InvalidBase(c)))
        .collect()
}

/// Decodes symbols into an upper-case ASCII sequence.
pub fn decode(symbols: &[u8]) -> String {
    symbols.iter().map(|&s| decode_base(s)).collect()
}

/// Packs up to sixteen symbols into a word; missing symbols are `A` (0).
pub fn pack(symbols: &[u8]) -> u32 {
    symbols
        .iter()
        .take(SYMBOLS_PER_WORD)
        .enumerate()
        .fold(0, |word, (i, &s)| {
            word | ((u32::from(s) & SYMBOL_MASK) << (SYMBOL_BITS as usize * i))
        })
}

/// Unpacks all sixteen symbols of a word.
pub fn unpack(word: u32) -> [u8; SYMBOLS_PER_WORD] {
    let mut symbols = [0; SYMBOLS_PER_WORD];
    for (i, s) in symbols.iter_mut().enumerate() {
        *s = ((word >> (SYMBOL_BITS as usize * i)) & SYMBOL_MASK) as u8;
    }
    symbols
}
