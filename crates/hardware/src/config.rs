//! Configuration for the cache and seed-extension models.
//!
//! This module defines the construction-time parameters of every model. It provides:
//! 1. **Defaults:** Baseline geometry and scoring constants of the reference design.
//! 2. **Structures:** `CacheConfig`, `ExtendConfig`, and `SearchConfig` under a root `Config`.
//! 3. **Loading:** JSON deserialization from a string or a file, with per-field defaults.
//!
//! Configuration is never a runtime surface: a model reads it once when it is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values describe the configuration the reference test vectors were
/// generated against.
mod defaults {
    /// Total cache capacity in bytes (8 KiB).
    pub const CACHE_SIZE: usize = 8192;

    /// Cache line size in bytes (one 128-bit memory transfer).
    pub const CACHE_LINE: usize = 16;

    /// Cache associativity (two-way set-associative).
    pub const CACHE_WAYS: usize = 2;

    /// X-drop threshold: extension stops once the score falls this far below the best.
    pub const XDROP_THRESHOLD: i32 = 20;

    /// Score added for a matching symbol pair.
    pub const MATCH_SCORE: i32 = 1;

    /// Score subtracted for a mismatching symbol pair.
    pub const MISMATCH_PENALTY: i32 = 3;

    /// Seed word length used by the software search.
    pub const KMER: usize = 3;

    /// HSPs scoring at or below this value are filtered out.
    pub const MIN_SCORE: i32 = -10;

    /// Largest cache the model will allocate (16 MiB).
    pub const MAX_CACHE_SIZE: usize = 1 << 24;

    /// Largest match reward or mismatch penalty.
    ///
    /// Keeps running scores over long subjects far from `i32` limits.
    pub const MAX_PAIR_SCORE: i32 = 1 << 10;
}

/// Root configuration.
///
/// # Example
///
/// ```
/// use blastn_xcel_core::config::Config;
///
/// let json = r#"{ "cache": { "ways": 1 } }"#;
/// let config = Config::from_json(json).unwrap_or_default();
/// assert_eq!(config.cache.ways, 1);
/// assert_eq!(config.cache.line_bytes, 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Cache geometry.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Seed-extension scoring.
    #[serde(default)]
    pub extend: ExtendConfig,

    /// Software seed search parameters.
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Parses a configuration from JSON text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, a geometry error
    /// if the cache section does not describe a buildable cache, and
    /// [`ConfigError::Scoring`] for out-of-range extension parameters.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.cache.validate()?;
        config.extend.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Cache geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Creates a configuration with explicit geometry.
    pub const fn new(size_bytes: usize, ways: usize, line_bytes: usize) -> Self {
        Self {
            size_bytes,
            line_bytes,
            ways,
        }
    }

    /// Number of sets described by this geometry (0 if it is invalid).
    pub const fn num_sets(&self) -> usize {
        if self.line_bytes == 0 || self.ways == 0 {
            return 0;
        }
        self.size_bytes / self.line_bytes / self.ways
    }

    /// Checks that the geometry can be built.
    ///
    /// Line size and set count must be powers of two so the address can be
    /// sliced into bit fields, and the capacity must divide into whole sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooLarge`] above 16 MiB, otherwise
    /// [`ConfigError::NotPowerOfTwo`] or [`ConfigError::Geometry`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_bytes > defaults::MAX_CACHE_SIZE {
            return Err(ConfigError::TooLarge {
                field: "size_bytes",
                value: self.size_bytes,
                max: defaults::MAX_CACHE_SIZE,
            });
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "line_bytes",
                value: self.line_bytes,
            });
        }
        let set_bytes = self.line_bytes.checked_mul(self.ways);
        if !set_bytes.is_some_and(|set| set != 0 && self.size_bytes % set == 0) {
            return Err(ConfigError::Geometry {
                size_bytes: self.size_bytes,
                ways: self.ways,
                line_bytes: self.line_bytes,
            });
        }
        let sets = self.num_sets();
        if !sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "num_sets",
                value: sets,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    /// 8 KiB, two-way, 16-byte lines (256 sets).
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
        }
    }
}

/// Ungapped extension scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtendConfig {
    /// X-drop threshold
    #[serde(default = "ExtendConfig::default_threshold")]
    pub threshold: i32,

    /// Reward for a match
    #[serde(default = "ExtendConfig::default_match")]
    pub match_score: i32,

    /// Penalty for a mismatch (subtracted)
    #[serde(default = "ExtendConfig::default_mismatch")]
    pub mismatch_penalty: i32,
}

impl ExtendConfig {
    fn default_threshold() -> i32 {
        defaults::XDROP_THRESHOLD
    }

    fn default_match() -> i32 {
        defaults::MATCH_SCORE
    }

    fn default_mismatch() -> i32 {
        defaults::MISMATCH_PENALTY
    }

    /// Checks that every parameter lies in its accepted range.
    ///
    /// `match_score` must be positive and `mismatch_penalty` non-negative,
    /// both at most 1024. `threshold` must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Scoring`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("match_score", self.match_score, 1, defaults::MAX_PAIR_SCORE),
            ("mismatch_penalty", self.mismatch_penalty, 0, defaults::MAX_PAIR_SCORE),
            ("threshold", self.threshold, 0, i32::MAX),
        ];
        for (field, value, min, max) in ranges {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::Scoring {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl Default for ExtendConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::XDROP_THRESHOLD,
            match_score: defaults::MATCH_SCORE,
            mismatch_penalty: defaults::MISMATCH_PENALTY,
        }
    }
}

/// Software seed search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Seed word length
    #[serde(default = "SearchConfig::default_kmer")]
    pub kmer: usize,

    /// HSPs must score strictly above this to be reported
    #[serde(default = "SearchConfig::default_min_score")]
    pub min_score: i32,
}

impl SearchConfig {
    fn default_kmer() -> usize {
        defaults::KMER
    }

    fn default_min_score() -> i32 {
        defaults::MIN_SCORE
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            kmer: defaults::KMER,
            min_score: defaults::MIN_SCORE,
        }
    }
}
