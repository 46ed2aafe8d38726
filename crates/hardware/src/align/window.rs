//! Seed-window slicing over packed sequence words.
//!
//! Aligns a query word and a database word so both seeds land on the same
//! hit position. The sequence with the larger seed is shifted down by the
//! seed difference; the other keeps its origin and is truncated to the
//! shared usable length. Bounds then apply to both sequences at once.

use serde::{Deserialize, Serialize};

use super::extend::SeedFrame;
use crate::common::ExtendError;
use crate::common::constants::{SYMBOL_BITS, SYMBOLS_PER_WORD};

/// Query and database words sliced around a shared hit position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeedWindow {
    /// Sliced query word.
    pub query: u32,
    /// Sliced database word.
    pub database: u32,
    /// Absolute query seed.
    pub q_start: usize,
    /// Absolute database seed.
    pub d_start: usize,
    /// Seed offset inside both sliced words.
    pub hit_pos: usize,
    /// Usable symbols in both sliced words.
    pub seq_len: usize,
}

impl SeedWindow {
    /// Extension frame describing this window.
    pub const fn frame(&self) -> SeedFrame {
        SeedFrame::Window {
            q_start: self.q_start,
            d_start: self.d_start,
            hit_pos: self.hit_pos,
            seq_len: self.seq_len,
        }
    }
}

/// Slices two packed 16-symbol words around their seeds.
///
/// # Example
///
/// ```
/// use blastn_xcel_core::align::slice_window;
///
/// let w = slice_window(0xFFFF_FF00, 0x0000_00FF, 6, 2)?;
/// assert_eq!((w.hit_pos, w.seq_len), (2, 12));
/// assert_eq!(w.query, 0x00FF_FFFF);
/// assert_eq!(w.database, 0x0000_00FF);
/// # Ok::<(), blastn_xcel_core::common::ExtendError>(())
/// ```
///
/// # Errors
///
/// Returns [`ExtendError::SeedOutOfRange`] if either seed exceeds 16.
pub fn slice_window(
    query: u32,
    database: u32,
    q_start: usize,
    d_start: usize,
) -> Result<SeedWindow, ExtendError> {
    for seed in [q_start, d_start] {
        if seed > SYMBOLS_PER_WORD {
            return Err(ExtendError::SeedOutOfRange {
                seed,
                len: SYMBOLS_PER_WORD,
            });
        }
    }

    let (sliced_query, sliced_database, hit_pos, seq_len) = if q_start > d_start {
        let hit_pos = d_start;
        let seq_len = d_start + SYMBOLS_PER_WORD - q_start;
        (
            shift_down(query, q_start - hit_pos),
            truncate(database, seq_len),
            hit_pos,
            seq_len,
        )
    } else {
        let hit_pos = q_start;
        let seq_len = q_start + SYMBOLS_PER_WORD - d_start;
        (
            truncate(query, seq_len),
            shift_down(database, d_start - hit_pos),
            hit_pos,
            seq_len,
        )
    };

    Ok(SeedWindow {
        query: sliced_query,
        database: sliced_database,
        q_start,
        d_start,
        hit_pos,
        seq_len,
    })
}

/// Drops the first `symbols` symbols of a word, zero-filling from the top.
fn shift_down(word: u32, symbols: usize) -> u32 {
    word.checked_shr(SYMBOL_BITS * symbols as u32).unwrap_or(0)
}

/// Keeps the first `symbols` symbols of a word.
fn truncate(word: u32, symbols: usize) -> u32 {
    let bits = SYMBOL_BITS * symbols as u32;
    if bits >= u32::BITS {
        word
    } else {
        word & ((1 << bits) - 1)
    }
}
