//! Backing stores behind the cache.
//!
//! The cache only ever talks to memory through [`BackingStore`]: a line-sized
//! read on refill and an exact byte-range write on write-through.
//! [`SparseMemory`] is the reference store: conceptually infinite, with every
//! byte that was never written reading as zero.

use std::collections::HashMap;

use crate::common::StorageError;

/// Byte-addressed memory beneath a cache.
pub trait BackingStore {
    /// Fills `buf` with the bytes starting at `addr`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot service the read.
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Writes `data` starting at `addr`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot service the write.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), StorageError>;
}

/// Sparse byte store; unset addresses read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseMemory {
    bytes: HashMap<u32, u8>,
}

impl SparseMemory {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with little-endian 32-bit words.
    ///
    /// # Arguments
    ///
    /// * `words` - `(address, value)` pairs.
    pub fn from_words(words: &[(u32, u32)]) -> Self {
        let mut mem = Self::new();
        for &(addr, value) in words {
            mem.store_word(addr, value);
        }
        mem
    }

    /// Reads one byte.
    #[inline]
    pub fn load_byte(&self, addr: u32) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(0)
    }

    /// Writes one byte.
    #[inline]
    pub fn store_byte(&mut self, addr: u32, value: u8) {
        let _ = self.bytes.insert(addr, value);
    }

    /// Reads `len` bytes (at most 16) as a little-endian integer.
    pub fn load(&self, addr: u32, len: usize) -> u128 {
        (0..len.min(16)).fold(0u128, |acc, i| {
            acc | (u128::from(self.load_byte(addr.wrapping_add(i as u32))) << (8 * i))
        })
    }

    /// Writes the low `len` bytes (at most 16) of `value`, least-significant byte first.
    pub fn store(&mut self, addr: u32, len: usize, value: u128) {
        for i in 0..len.min(16) {
            self.store_byte(addr.wrapping_add(i as u32), (value >> (8 * i)) as u8);
        }
    }

    /// Reads a little-endian 32-bit word.
    pub fn load_word(&self, addr: u32) -> u32 {
        self.load(addr, 4) as u32
    }

    /// Writes a little-endian 32-bit word.
    pub fn store_word(&mut self, addr: u32, value: u32) {
        self.store(addr, 4, u128::from(value));
    }

    /// Number of bytes that have ever been written.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl BackingStore for SparseMemory {
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.load_byte(addr.wrapping_add(i as u32));
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), StorageError> {
        for (i, &byte) in data.iter().enumerate() {
            self.store_byte(addr.wrapping_add(i as u32), byte);
        }
        Ok(())
    }
}
