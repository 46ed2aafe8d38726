//! Memory-side interfaces.
//!
//! This module holds everything the models exchange with memory. It provides:
//! 1. **Messages:** The `MemReq` / `MemResp` wire format consumed by the cache.
//! 2. **Stores:** The `BackingStore` trait and the sparse reference store.
//! 3. **Ports:** The `MemPort` trait through which the accelerator reaches memory.

/// Memory request/response messages.
pub mod message;

/// Backing store trait and sparse memory.
pub mod store;

pub use message::{MemMsgType, MemReq, MemResp, decode_len, encode_len};
pub use store::{BackingStore, SparseMemory};

use crate::common::CacheError;

/// Word-level memory access used by the accelerator.
///
/// Implemented by [`CacheEngine`](crate::cache::CacheEngine) so accelerator
/// traffic goes through the cache, and by [`SparseMemory`] for direct access.
pub trait MemPort {
    /// Reads `len` bytes at `addr` as a little-endian integer.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the access is malformed or memory fails.
    fn mem_read(&mut self, addr: u32, len: usize) -> Result<u128, CacheError>;

    /// Writes the low `len` bytes of `data` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the access is malformed or memory fails.
    fn mem_write(&mut self, addr: u32, len: usize, data: u128) -> Result<(), CacheError>;
}

impl MemPort for SparseMemory {
    fn mem_read(&mut self, addr: u32, len: usize) -> Result<u128, CacheError> {
        Ok(self.load(addr, len))
    }

    fn mem_write(&mut self, addr: u32, len: usize, data: u128) -> Result<(), CacheError> {
        self.store(addr, len, data);
        Ok(())
    }
}
