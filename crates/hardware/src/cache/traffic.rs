//! Deterministic random cache traffic.
//!
//! Generates the access streams used to cross-check the cache engine against
//! the reference model: random low addresses, a small pool of hot addresses,
//! unit and wide strides, stride mixed with a hot pool, a sliding history of
//! recent addresses, and random sub-word accesses that never cross a line.
//! A xorshift generator keeps every stream reproducible from its seed.

use serde::{Deserialize, Serialize};

/// Address bits used for fully random addresses.
const ADDR_BITS: u32 = 20;
/// Highest address of the low-address patterns.
const LOW_ADDR_LIMIT: u64 = 0x400;
/// Size of the hot address pool.
const POOL_LEN: usize = 10;
/// Size of the recent-address history.
const HIST_LEN: usize = 20;
/// Percent chance of reusing a pooled or historical address.
const REUSE_PERCENT: u64 = 60;
/// Word stride of the wide-stride pattern.
const VSTRIDE_WORDS: u32 = 3;
/// Base address of the sub-word region.
const SUBWORD_BASE: u32 = 0x1000;
/// Size of the sub-word region in bytes.
const SUBWORD_REGION: u64 = 0x1000;
/// Line size assumed by the sub-word pattern.
const SUBWORD_LINE: u64 = 16;

/// Shape of a generated access stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficPattern {
    /// Word writes to random addresses below 0x400.
    WriteLowAddr,
    /// Word reads from random addresses below 0x400.
    ReadLowAddr,
    /// Mixed word reads/writes below 0x400.
    LowAddr,
    /// 60% of accesses drawn from a pool of 10 random addresses.
    Repeat,
    /// Consecutive words.
    Stride,
    /// Every third word.
    VStride,
    /// Consecutive words, 60% replaced by a pooled address.
    RStride,
    /// 60% of accesses drawn from the 20 most recent addresses.
    History,
    /// Byte, halfword, and word accesses within one line of a 4 KiB region.
    Subword,
}

impl TrafficPattern {
    /// Every pattern, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::WriteLowAddr,
        Self::ReadLowAddr,
        Self::LowAddr,
        Self::Repeat,
        Self::Stride,
        Self::VStride,
        Self::RStride,
        Self::History,
        Self::Subword,
    ];
}

/// One generated access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum TrafficOp {
    /// Read `len` bytes.
    Read {
        /// Byte address.
        addr: u32,
        /// Length in bytes.
        len: usize,
    },
    /// Write the low `len` bytes of `data`.
    Write {
        /// Byte address.
        addr: u32,
        /// Length in bytes.
        len: usize,
        /// Value to write.
        data: u128,
    },
}

impl TrafficOp {
    /// Byte address of the access.
    pub const fn addr(&self) -> u32 {
        match *self {
            Self::Read { addr, .. } | Self::Write { addr, .. } => addr,
        }
    }
}

/// xorshift64 generator.
#[derive(Clone, Debug)]
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound.max(1)
    }

    fn percent(&mut self, chance: u64) -> bool {
        self.below(100) < chance
    }

    fn addr_bits(&mut self, bits: u32) -> u32 {
        (self.next_u64() & ((1u64 << bits) - 1)) as u32
    }
}

/// Endless, reproducible stream of [`TrafficOp`]s.
///
/// ```
/// use blastn_xcel_core::cache::{TrafficGen, TrafficPattern};
///
/// let ops: Vec<_> = TrafficGen::new(TrafficPattern::Stride, 7).take(4).collect();
/// assert_eq!(ops[3].addr(), 12);
/// ```
#[derive(Clone, Debug)]
pub struct TrafficGen {
    rng: XorShift,
    pattern: TrafficPattern,
    step: u32,
    pool: Vec<u32>,
    history: Vec<u32>,
}

impl TrafficGen {
    /// Creates a generator for `pattern` seeded with `seed`.
    pub fn new(pattern: TrafficPattern, seed: u64) -> Self {
        let mut rng = XorShift::new(seed);
        let pool = (0..POOL_LEN).map(|_| rng.addr_bits(ADDR_BITS)).collect();
        let history = (0..HIST_LEN).map(|_| rng.addr_bits(ADDR_BITS)).collect();
        Self {
            rng,
            pattern,
            step: 0,
            pool,
            history,
        }
    }

    /// Pattern this generator produces.
    pub const fn pattern(&self) -> TrafficPattern {
        self.pattern
    }

    fn pooled(&mut self) -> u32 {
        self.pool[self.rng.below(POOL_LEN as u64) as usize]
    }

    fn word_addr(&mut self) -> u32 {
        let i = self.step;
        let addr = match self.pattern {
            TrafficPattern::WriteLowAddr | TrafficPattern::ReadLowAddr | TrafficPattern::LowAddr => {
                self.rng.below(LOW_ADDR_LIMIT + 1) as u32
            }
            TrafficPattern::Repeat => {
                if self.rng.percent(REUSE_PERCENT) {
                    self.pooled()
                } else {
                    self.rng.addr_bits(ADDR_BITS)
                }
            }
            TrafficPattern::Stride => i.wrapping_mul(4),
            TrafficPattern::VStride => i.wrapping_mul(4 * VSTRIDE_WORDS),
            TrafficPattern::RStride => {
                if self.rng.percent(REUSE_PERCENT) {
                    self.pooled()
                } else {
                    i.wrapping_mul(4)
                }
            }
            TrafficPattern::History => {
                let picked = if self.rng.percent(REUSE_PERCENT) {
                    self.history[self.rng.below(HIST_LEN as u64) as usize]
                } else {
                    self.rng.addr_bits(ADDR_BITS)
                };
                let addr = picked & !3;
                let _ = self.history.pop();
                self.history.insert(0, addr);
                addr
            }
            // Handled by `subword`.
            TrafficPattern::Subword => SUBWORD_BASE,
        };
        addr & !3
    }

    fn subword(&mut self) -> (u32, usize) {
        let len = [1usize, 2, 4][self.rng.below(3) as usize];
        let offset = self.rng.below(SUBWORD_LINE - len as u64 + 1);
        let index = self.rng.below(SUBWORD_REGION / SUBWORD_LINE);
        let addr = SUBWORD_BASE + (index * SUBWORD_LINE + offset) as u32;
        (addr, len)
    }
}

impl Iterator for TrafficGen {
    type Item = TrafficOp;

    fn next(&mut self) -> Option<TrafficOp> {
        let (addr, len) = if self.pattern == TrafficPattern::Subword {
            self.subword()
        } else {
            (self.word_addr(), 4)
        };
        self.step = self.step.wrapping_add(1);

        let write = match self.pattern {
            TrafficPattern::WriteLowAddr => true,
            TrafficPattern::ReadLowAddr => false,
            _ => self.rng.below(2) == 1,
        };

        Some(if write {
            let mask = (1u128 << (8 * len)) - 1;
            TrafficOp::Write {
                addr,
                len,
                data: u128::from(self.rng.next_u64()) & mask,
            }
        } else {
            TrafficOp::Read { addr, len }
        })
    }
}
