//! Transaction-level reference model.
//!
//! Pairs a [`HitMissOracle`] with a flat [`SparseMemory`] to produce the
//! exact request/response pairs a correct cache must emit for a stream of
//! accesses. Data comes straight from memory, so the expected read data never
//! depends on any cache state; only the `test` field does.

use crate::cache::{HitMissOracle, TrafficOp};
use crate::common::ConfigError;
use crate::config::CacheConfig;
use crate::mem::{MemReq, MemResp, SparseMemory, encode_len};

/// Expected behaviour of a cache, recorded as wire transactions.
#[derive(Clone, Debug)]
pub struct ReferenceModel {
    oracle: HitMissOracle,
    mem: SparseMemory,
    transactions: Vec<(MemReq, MemResp)>,
    opaque: u8,
}

impl ReferenceModel {
    /// Creates a model for `config` starting from the contents of `mem`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry is invalid.
    pub fn new(config: &CacheConfig, mem: SparseMemory) -> Result<Self, ConfigError> {
        Ok(Self {
            oracle: HitMissOracle::from_config(config)?,
            mem,
            transactions: Vec::new(),
            opaque: 0,
        })
    }

    /// Records a read of `len` bytes at `addr` and returns the expected response.
    pub fn read(&mut self, addr: u32, len: usize) -> MemResp {
        self.record(TrafficOp::Read { addr, len })
    }

    /// Records a write of the low `len` bytes of `data` at `addr`.
    pub fn write(&mut self, addr: u32, len: usize, data: u128) -> MemResp {
        self.record(TrafficOp::Write { addr, len, data })
    }

    /// Records one generated access.
    pub fn apply(&mut self, op: TrafficOp) -> MemResp {
        self.record(op)
    }

    /// Advances the model by one access without recording it.
    ///
    /// Returns the request a client would send and the response a correct
    /// cache must give. Long checking runs use this to keep memory flat.
    pub fn expect(&mut self, op: TrafficOp) -> (MemReq, MemResp) {
        let opaque = self.next_opaque();
        match op {
            TrafficOp::Read { addr, len } => {
                let req = MemReq::read(opaque, addr, encode_len(len));
                let hit = self.oracle.access(addr);
                let data = self.mem.load(addr, len);
                (req, MemResp::read(opaque, u8::from(hit), req.len, data))
            }
            TrafficOp::Write { addr, len, data } => {
                let req = MemReq::write(opaque, addr, encode_len(len), data);
                let hit = self.oracle.access(addr);
                self.mem.store(addr, len, data);
                (req, MemResp::write(opaque, u8::from(hit), req.len))
            }
        }
    }

    /// Every `(request, expected response)` pair recorded so far.
    pub fn transactions(&self) -> &[(MemReq, MemResp)] {
        &self.transactions
    }

    /// Memory contents after the recorded writes.
    pub const fn memory(&self) -> &SparseMemory {
        &self.mem
    }

    /// The underlying hit/miss predictor.
    pub const fn oracle(&self) -> &HitMissOracle {
        &self.oracle
    }

    fn record(&mut self, op: TrafficOp) -> MemResp {
        let (req, resp) = self.expect(op);
        self.transactions.push((req, resp));
        resp
    }

    fn next_opaque(&mut self) -> u8 {
        let opaque = self.opaque;
        self.opaque = self.opaque.wrapping_add(1);
        opaque
    }
}
