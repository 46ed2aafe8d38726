//! Error types for the cache, alignment, and accelerator models.
//!
//! This module defines every fallible outcome the models report. It provides:
//! 1. **Storage errors:** Failures of a backing store underneath the cache.
//! 2. **Cache errors:** Caller contract violations on sub-word requests, and propagated storage failures.
//! 3. **Configuration errors:** Invalid cache geometry and unreadable configuration files.
//! 4. **Extension errors:** Seeds outside their sequences and internal span violations.
//! 5. **Accelerator errors:** Register protocol violations and memory failures.
//!
//! Degenerate alignments and cache misses are ordinary results, never errors.

use thiserror::Error;

use crate::xcel::XcelPhase;

/// Failure reported by a [`BackingStore`](crate::mem::BackingStore) implementation.
///
/// The cache propagates these unchanged; it never retries or masks them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The store cannot service the address at all.
    #[error("backing store unavailable at {addr:#010x}")]
    Unavailable {
        /// Faulting byte address.
        addr: u32,
    },

    /// The store accepted the request but failed to complete it.
    #[error("backing store fault at {addr:#010x}: {reason}")]
    Fault {
        /// Faulting byte address.
        addr: u32,
        /// Human-readable description from the store.
        reason: String,
    },
}

/// Errors returned by [`CacheEngine`](crate::cache::CacheEngine) and the sub-word data units.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The requested bytes cross the end of the cache line.
    #[error("access of {len} bytes at offset {offset} crosses a {line_bytes}-byte line")]
    Range {
        /// Byte offset within the line.
        offset: usize,
        /// Requested length in bytes.
        len: usize,
        /// Line size in bytes.
        line_bytes: usize,
    },

    /// The requested length is not 1, 2, 4, 8, or 16 bytes.
    #[error("unsupported access length {0}")]
    InvalidLength(usize),

    /// The backing store failed during refill or write-through.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A size that must be a power of two is not.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: usize,
    },

    /// The total size cannot be divided into whole sets of the given ways and line size.
    #[error("{size_bytes} bytes cannot hold whole sets of {ways} x {line_bytes}-byte lines")]
    Geometry {
        /// Total cache size in bytes.
        size_bytes: usize,
        /// Associativity.
        ways: usize,
        /// Line size in bytes.
        line_bytes: usize,
    },

    /// The total size exceeds what the model will allocate.
    #[error("{field} of {value} exceeds the limit of {max}")]
    TooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },

    /// A scoring parameter lies outside its accepted range.
    #[error("{field} must lie in {min}..={max}, got {value}")]
    Scoring {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: i32,
        /// Smallest accepted value.
        min: i32,
        /// Largest accepted value.
        max: i32,
    },

    /// The configuration text is not valid JSON for [`Config`](crate::config::Config).
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`SeedExtender`](crate::align::SeedExtender).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtendError {
    /// A seed or window lies outside the sequence it indexes.
    #[error("seed {seed} outside sequence of length {len}")]
    SeedOutOfRange {
        /// Offending seed coordinate.
        seed: usize,
        /// Length of the sequence (or window) it was checked against.
        len: usize,
    },

    /// A window's hit position lies past the seed it is relative to.
    #[error("hit position {hit_pos} lies beyond seed {start}")]
    HitBeyondStart {
        /// Hit position inside the window.
        hit_pos: usize,
        /// Absolute seed coordinate.
        start: usize,
    },

    /// A character outside `ACGT` appeared in a nucleotide sequence.
    #[error("invalid nucleotide {0:?}")]
    InvalidBase(char),

    /// The best window spans a different number of symbols in query and database.
    ///
    /// The extension loop moves both sequences in lock step, so this signals a
    /// defect in the engine rather than bad input.
    #[error("asymmetric extension span: query {query_span}, database {database_span}")]
    AsymmetricSpan {
        /// `q_r_max - q_l_max`.
        query_span: isize,
        /// `d_r_max - d_l_max`.
        database_span: isize,
    },
}

/// Errors returned by the accelerator register front end.
#[derive(Debug, Error)]
pub enum XcelError {
    /// A register outside the set allowed in the current phase was addressed.
    #[error("register xr{addr} not accessible during {phase}")]
    IllegalRegister {
        /// Register address.
        addr: u8,
        /// Protocol phase at the time of the request.
        phase: XcelPhase,
    },

    /// A read arrived during setup, or a write arrived while results are pending.
    #[error("unexpected {kind} request during {phase}")]
    UnexpectedRequest {
        /// `"read"` or `"write"`.
        kind: &'static str,
        /// Protocol phase at the time of the request.
        phase: XcelPhase,
    },

    /// The seed extension rejected the configured operands.
    #[error(transparent)]
    Extend(#[from] ExtendError),

    /// A memory access issued by the accelerator failed.
    #[error(transparent)]
    Memory(#[from] CacheError),
}
