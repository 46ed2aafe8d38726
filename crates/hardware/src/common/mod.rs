//! Common types shared by the cache, alignment, and accelerator models.
//!
//! This module provides the building blocks every other module leans on:
//! 1. **Addresses:** Decomposition of 32-bit addresses into tag, index, and offset.
//! 2. **Constants:** Address width, transfer width, and packed-symbol layout.
//! 3. **Errors:** `thiserror` enums for storage, cache, configuration, extension, and accelerator failures.

/// Cache address decomposition.
pub mod addr;

/// Constants shared across the models.
pub mod constants;

/// Error types.
pub mod error;

pub use addr::{AddrLayout, CacheAddr};
pub use error::{CacheError, ConfigError, ExtendError, StorageError, XcelError};
