//! Write-Through Set-Associative Cache Model.
//!
//! This module implements the functional cache that sits between a client and
//! a byte-addressed backing store. It models:
//! 1. **Lookup:** Address decomposition and a way-ascending tag check per set.
//! 2. **Replacement:** LRU victim selection and refill of whole lines on a miss.
//! 3. **Data movement:** Sub-word reads and byte-enabled writes within a line.
//! 4. **Write-through:** Every write updates the backing store at the exact byte range.
//!
//! Because every write is forwarded to the store, lines are never dirty and an
//! eviction only gives up residency.

/// Sub-word read/write data units.
pub mod data_unit;

/// Reference models used to check the engine.
pub mod model;

/// Independent hit/miss and LRU predictor.
pub mod oracle;

/// Cache replacement policy implementations.
pub mod policies;

/// Deterministic random traffic generation.
pub mod traffic;

use tracing::{trace, warn};

use self::data_unit::{check_access, read_data, write_data};
use self::policies::{LruPolicy, ReplacementPolicy};
use crate::common::{AddrLayout, CacheAddr, CacheError, ConfigError};
use crate::config::CacheConfig;
use crate::mem::{BackingStore, MemMsgType, MemPort, MemReq, MemResp, SparseMemory};
use crate::stats::CacheStats;

pub use self::model::ReferenceModel;
pub use self::oracle::HitMissOracle;
pub use self::traffic::{TrafficGen, TrafficOp, TrafficPattern};

/// Tag and validity of one cache slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CacheLine {
    tag: u32,
    valid: bool,
}

/// Result of a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    /// Requested bytes, least-significant byte first.
    pub data: u128,
    /// Whether the line was resident before the access.
    pub hit: bool,
}

/// Functional model of a write-through, write-allocate, LRU cache.
///
/// The engine owns its tag/valid/LRU arrays, the line data, and the backing
/// store. Each call runs the whole tag check, LRU update, and refill sequence
/// to completion; callers sharing an engine across threads must hold one lock
/// around each call.
#[derive(Debug)]
pub struct CacheEngine<S = SparseMemory> {
    layout: AddrLayout,
    lines: Vec<CacheLine>,
    data: Vec<u8>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: LruPolicy,
    store: S,
    stats: CacheStats,
}

impl<S: BackingStore> CacheEngine<S> {
    /// Creates an empty cache (all lines invalid) in front of `store`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry cannot be sliced into
    /// power-of-two offset and index fields.
    pub fn new(config: &CacheConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let num_sets = config.num_sets();
        let ways = config.ways;
        let line_bytes = config.line_bytes;

        Ok(Self {
            layout: AddrLayout::new(line_bytes, num_sets),
            lines: vec![CacheLine::default(); num_sets * ways],
            data: vec![0; num_sets * ways * line_bytes],
            num_sets,
            ways,
            line_bytes,
            policy: LruPolicy::new(num_sets, ways),
            store,
            stats: CacheStats::default(),
        })
    }

    /// Reads `len` bytes at `addr`.
    ///
    /// On a miss the LRU way of the set is refilled with the line-aligned
    /// block from the backing store before the bytes are sliced out.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Range`] or [`CacheError::InvalidLength`] for a
    /// malformed request (no state changes), or [`CacheError::Storage`] if
    /// the refill fails.
    pub fn read(&mut self, addr: u32, len: usize) -> Result<Access, CacheError> {
        let offset = self.checked_offset(addr, len)?;

        let (slot, hit) = self.locate(addr)?;
        self.stats.reads += 1;
        self.count(hit);

        let data = read_data(self.line(slot), offset, len)?;
        Ok(Access { data, hit })
    }

    /// Writes the low `len` bytes of `data` at `addr` and returns the hit flag.
    ///
    /// The line is allocated on a miss, the targeted bytes are merged into it,
    /// and the same bytes are written through to the backing store.
    ///
    /// # Errors
    ///
    /// As for [`CacheEngine::read`]; a failed write-through leaves the cached
    /// line unmodified but still counts the write and any refill it caused.
    pub fn write(&mut self, addr: u32, len: usize, data: u128) -> Result<bool, CacheError> {
        self.store_path(MemMsgType::Write, addr, len, data)
    }

    /// Preloads `len` bytes at `addr`.
    ///
    /// Moves data exactly like [`CacheEngine::write`]; the residency outcome
    /// is not reported and not counted.
    ///
    /// # Errors
    ///
    /// As for [`CacheEngine::write`].
    pub fn write_init(&mut self, addr: u32, len: usize, data: u128) -> Result<(), CacheError> {
        let _ = self.store_path(MemMsgType::WriteInit, addr, len, data)?;
        Ok(())
    }

    /// Serves one wire-level memory request.
    ///
    /// A wire length of `0` is a full 16-byte transfer. The response echoes
    /// the kind, opaque field, and length; `test` is `1` on a hit, `0` on a
    /// miss, and always `0` for `WriteInit`.
    ///
    /// # Errors
    ///
    /// As for the underlying read or write.
    pub fn handle(&mut self, req: &MemReq) -> Result<MemResp, CacheError> {
        let len = req.byte_len();
        match req.kind {
            MemMsgType::Read => {
                let access = self.read(req.addr, len)?;
                Ok(MemResp::read(req.opaque, u8::from(access.hit), req.len, access.data))
            }
            MemMsgType::Write => {
                let hit = self.write(req.addr, len, req.data)?;
                Ok(MemResp::write(req.opaque, u8::from(hit), req.len))
            }
            MemMsgType::WriteInit => {
                self.write_init(req.addr, len, req.data)?;
                Ok(MemResp {
                    kind: MemMsgType::WriteInit,
                    opaque: req.opaque,
                    test: 0,
                    len: req.len,
                    data: 0,
                })
            }
        }
    }

    /// Returns `true` if the line holding `addr` is resident. Does not touch LRU state.
    pub fn is_resident(&self, addr: u32) -> bool {
        let CacheAddr { tag, index, .. } = self.layout.split(addr);
        self.lookup(tag, index).is_some()
    }

    /// Drops residency of every line. Nothing is lost: the store is always current.
    pub fn invalidate_all(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
        }
    }

    /// LRU order of `set`, most recently used first.
    pub fn lru_order(&self, set: usize) -> &[usize] {
        self.policy.order(set)
    }

    /// Tag held by `(set, way)`, or `None` if the slot is invalid.
    pub fn tag_at(&self, set: usize, way: usize) -> Option<u32> {
        let line = self.lines[set * self.ways + way];
        line.valid.then_some(line.tag)
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Address layout used for decomposition.
    pub const fn layout(&self) -> &AddrLayout {
        &self.layout
    }

    /// Access counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store, bypassing the cache.
    ///
    /// Writing through this reference does not update resident lines.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the cache and returns its backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Shared path of `write` and `write_init`.
    ///
    /// The request is counted once its line is resident, before the
    /// write-through, so every refill has a counted request behind it.
    fn store_path(
        &mut self,
        kind: MemMsgType,
        addr: u32,
        len: usize,
        data: u128,
    ) -> Result<bool, CacheError> {
        let offset = self.checked_offset(addr, len)?;

        let (slot, hit) = self.locate(addr)?;
        if kind == MemMsgType::WriteInit {
            self.stats.write_inits += 1;
        } else {
            self.stats.writes += 1;
            self.count(hit);
        }

        let bytes = data.to_le_bytes();
        self.store.write_bytes(addr, &bytes[..len])?;
        let wben = write_data(self.line_mut(slot), offset, len, data)?;
        trace!(slot, wben, "merge {len} bytes at {addr:#010x}");
        Ok(hit)
    }

    /// Line offset of `addr` once the access is known to fit in one line.
    fn checked_offset(&self, addr: u32, len: usize) -> Result<usize, CacheError> {
        let offset = self.layout.split(addr).offset;
        check_access(offset, len, self.line_bytes)
            .inspect_err(|e| warn!(len, "rejected access at {addr:#010x}: {e}"))?;
        Ok(offset)
    }

    /// Finds the way holding `tag` in set `index`, scanning ways in ascending order.
    fn lookup(&self, tag: u32, index: usize) -> Option<usize> {
        let base = index * self.ways;
        (0..self.ways).find(|&way| {
            let line = &self.lines[base + way];
            line.valid && line.tag == tag
        })
    }

    /// Returns the slot holding `addr`, refilling the LRU way on a miss.
    ///
    /// The refill is read into a scratch buffer first so a failing store
    /// leaves the tag, valid, LRU, and data arrays untouched.
    fn locate(&mut self, addr: u32) -> Result<(usize, bool), CacheError> {
        let CacheAddr { tag, index, .. } = self.layout.split(addr);
        let base = index * self.ways;

        if let Some(way) = self.lookup(tag, index) {
            self.policy.update(index, way);
            trace!(set = index, way, tag, "hit {addr:#010x}");
            return Ok((base + way, true));
        }

        let victim = self.policy.victim(index);
        let slot = base + victim;
        let line_addr = self.layout.line_base(addr);

        let mut fill = vec![0u8; self.line_bytes];
        self.store.read_bytes(line_addr, &mut fill)?;

        if self.lines[slot].valid {
            self.stats.evictions += 1;
            trace!(
                set = index,
                way = victim,
                "evict {:#010x}",
                self.layout.compose(self.lines[slot].tag, index)
            );
        }
        self.line_mut(slot).copy_from_slice(&fill);
        self.lines[slot] = CacheLine { tag, valid: true };
        self.policy.update(index, victim);
        self.stats.refills += 1;
        trace!(set = index, way = victim, tag, "miss {addr:#010x}, refill {line_addr:#010x}");

        Ok((slot, false))
    }

    fn count(&mut self, hit: bool) {
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
    }

    fn line(&self, slot: usize) -> &[u8] {
        let start = slot * self.line_bytes;
        &self.data[start..start + self.line_bytes]
    }

    fn line_mut(&mut self, slot: usize) -> &mut [u8] {
        let start = slot * self.line_bytes;
        &mut self.data[start..start + self.line_bytes]
    }
}

impl<S: BackingStore> MemPort for CacheEngine<S> {
    fn mem_read(&mut self, addr: u32, len: usize) -> Result<u128, CacheError> {
        self.read(addr, len).map(|access| access.data)
    }

    fn mem_write(&mut self, addr: u32, len: usize, data: u128) -> Result<(), CacheError> {
        self.write(addr, len, data).map(|_| ())
    }
}
