//! BLASTN seed-extension accelerator models.
//!
//! This crate implements functional models of a BLASTN accelerator and the
//! memory system it sits behind:
//! 1. **Cache:** A write-through, write-allocate, LRU set-associative cache with sub-word access.
//! 2. **Checking:** An independent hit/miss oracle, a transaction reference model, and traffic generators.
//! 3. **Alignment:** Ungapped X-drop seed extension, window slicing, and a host-side seed search.
//! 4. **Accelerator:** The register protocol a processor uses to drive the extension engine.
//! 5. **Support:** Configuration, memory messages and stores, statistics, and errors.

/// Seed extension, window slicing, and seed search.
pub mod align;
/// Set-associative cache engine and its checking models.
pub mod cache;
/// Common types (address layout, constants, errors).
pub mod common;
/// Model configuration (defaults, JSON loading).
pub mod config;
/// Memory messages, backing stores, and ports.
pub mod mem;
/// Cache statistics.
pub mod stats;
/// Accelerator register front end.
pub mod xcel;

/// Seed-extension engine; construct with `SeedExtender::new` or `default()`.
pub use crate::align::SeedExtender;
/// Cache engine; construct with `CacheEngine::new`.
pub use crate::cache::CacheEngine;
/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Register-mapped accelerator.
pub use crate::xcel::BlastnXcel;
