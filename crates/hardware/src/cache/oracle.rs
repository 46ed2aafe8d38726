//! Hit/Miss Oracle.
//!
//! Predicts the hit/miss outcome and LRU evolution of an access stream without
//! moving any data. It deliberately keeps its own tag, valid, and LRU arrays
//! (plain nested vectors with list-based LRU bookkeeping) instead of sharing
//! the engine's replacement policy, so a bug in one cannot hide a bug in the
//! other when the two are compared.

use crate::common::{AddrLayout, CacheAddr, ConfigError};
use crate::config::CacheConfig;

/// Ground-truth model of the cache's residency and replacement behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitMissOracle {
    layout: AddrLayout,
    ways: usize,
    /// `tag[set][way]`
    tag: Vec<Vec<u32>>,
    /// `valid[set][way]`
    valid: Vec<Vec<bool>>,
    /// `lru[set]`, most recently used first.
    lru: Vec<Vec<usize>>,
}

impl HitMissOracle {
    /// Creates an oracle for a cache of `size_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry is invalid.
    pub fn new(size_bytes: usize, ways: usize, line_bytes: usize) -> Result<Self, ConfigError> {
        Self::from_config(&CacheConfig::new(size_bytes, ways, line_bytes))
    }

    /// Creates an oracle matching a cache configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry is invalid.
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let nsets = config.num_sets();
        let ways = config.ways;
        Ok(Self {
            layout: AddrLayout::new(config.line_bytes, nsets),
            ways,
            tag: vec![vec![0; ways]; nsets],
            valid: vec![vec![false; ways]; nsets],
            lru: (0..nsets).map(|_| (0..ways).collect()).collect(),
        })
    }

    /// Splits an address into `(tag, index, offset)`, ignoring bank bits.
    pub fn split_address(&self, addr: u32) -> (u32, usize, usize) {
        let CacheAddr { tag, index, offset } = self.layout.split(addr);
        (tag, index, offset)
    }

    /// Marks `way` as most recently used in set `idx`.
    pub fn lru_hit(&mut self, idx: usize, way: usize) {
        let list = &mut self.lru[idx];
        list.retain(|&w| w != way);
        list.insert(0, way);
    }

    /// Least recently used way of set `idx`.
    pub fn lru_get(&self, idx: usize) -> usize {
        self.lru[idx].last().copied().unwrap_or(0)
    }

    /// Checks set `idx` for a valid `tag`; on a hit the way becomes MRU.
    ///
    /// Ways are scanned in ascending order and the first match wins.
    pub fn tag_check(&mut self, tag: u32, idx: usize) -> bool {
        let hit_way =
            (0..self.ways).find(|&way| self.valid[idx][way] && self.tag[idx][way] == tag);
        match hit_way {
            Some(way) => {
                self.lru_hit(idx, way);
                true
            }
            None => false,
        }
    }

    /// Installs `tag` into the LRU way of set `idx` and makes it MRU.
    pub fn refill(&mut self, tag: u32, idx: usize) {
        let victim = self.lru_get(idx);
        self.tag[idx][victim] = tag;
        self.valid[idx][victim] = true;
        self.lru_hit(idx, victim);
    }

    /// Simulates one access; returns `true` on a hit.
    pub fn access(&mut self, addr: u32) -> bool {
        let (tag, idx, _) = self.split_address(addr);
        let hit = self.tag_check(tag, idx);
        if !hit {
            self.refill(tag, idx);
        }
        hit
    }

    /// LRU list of set `idx`, most recently used first.
    pub fn lru(&self, idx: usize) -> &[usize] {
        &self.lru[idx]
    }

    /// Valid tags of set `idx`, by way.
    pub fn tags(&self, idx: usize) -> Vec<Option<u32>> {
        (0..self.ways)
            .map(|way| self.valid[idx][way].then_some(self.tag[idx][way]))
            .collect()
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.lru.len()
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }
}
