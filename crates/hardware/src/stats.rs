//! Cache statistics collection.
//!
//! Counts the traffic a [`CacheEngine`](crate::cache::CacheEngine) has served:
//! requests by kind, hit/miss outcomes, refills, and evictions of valid lines.
//! `WriteInit` requests are counted separately and excluded from hit/miss totals.

use std::fmt;

use serde::Serialize;

/// Per-cache access counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Read requests served.
    pub reads: u64,
    /// Write requests whose line was made resident, including ones whose
    /// write-through then failed.
    pub writes: u64,
    /// Preload requests served.
    pub write_inits: u64,
    /// Reads and writes that found their line resident.
    pub hits: u64,
    /// Reads and writes that had to refill.
    pub misses: u64,
    /// Lines fetched from the backing store.
    ///
    /// Equals `misses` plus the preloads that missed.
    pub refills: u64,
    /// Refills that displaced a valid line.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of reads and writes that hit, or `0.0` before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  reads       {}", self.reads)?;
        writeln!(f, "  writes      {}", self.writes)?;
        writeln!(f, "  write_inits {}", self.write_inits)?;
        writeln!(f, "  hits        {}", self.hits)?;
        writeln!(f, "  misses      {}", self.misses)?;
        writeln!(f, "  refills     {}", self.refills)?;
        writeln!(f, "  evictions   {}", self.evictions)?;
        write!(f, "  hit rate    {:.2}%", self.hit_rate() * 100.0)
    }
}
