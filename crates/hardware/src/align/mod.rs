//! Ungapped Seed-Extension Alignment.
//!
//! This module implements the alignment side of the accelerator. It provides:
//! 1. **Sequences:** 2-bit nucleotide codes and 16-symbol packed words.
//! 2. **Extension:** X-drop ungapped extension in absolute or window coordinates.
//! 3. **Windows:** Slicing of packed words around a shared hit position.
//! 4. **Search:** A host-side k-mer seed search built on the extender.

/// Seed extension engine.
pub mod extend;

/// Host-side k-mer search.
pub mod search;

/// Nucleotide encoding and packing.
pub mod seq;

/// Window slicing.
pub mod window;

pub use extend::{Alignment, SeedExtender, SeedFrame};
pub use search::{Hsp, SeedSearch, WordHit};
pub use seq::{decode, encode, pack, unpack};
pub use window::{SeedWindow, slice_window};
