//! BLASTN Seed-Extension Accelerator.
//!
//! Register-mapped wrapper around [`SeedExtender`]. The processor writes the
//! operands, writes `xr0` to start, and then collects the four results
//! (score, length, query start, database start). Two protocols exist:
//!
//! # Register Map (`V1`, register results)
//!
//! * `xr0`: write starts; read returns 1 and re-arms setup
//! * `xr1`: query word (write) / score (read)
//! * `xr2`: database word (write) / length (read)
//! * `xr3`: query seed (write) / query start out (read)
//! * `xr4`: database seed (write) / database start out (read)
//!
//! # Register Map (`V2`, memory results)
//!
//! * `xr0`: write starts; read returns 1 once results are in memory
//! * `xr1`: query word
//! * `xr2`: address of the database word
//! * `xr3`, `xr4`: query and database seeds
//! * `xr5` .. `xr8`: result addresses for score, length, query start, database start

use tracing::{debug, warn};

use super::{XcelMsgType, XcelPhase, XcelReq, XcelResp};
use crate::align::{Alignment, SeedExtender};
use crate::common::XcelError;
use crate::mem::MemPort;

/// Start / status register.
const XR_GO: u8 = 0;
/// Query word.
const XR_QUERY: u8 = 1;
/// Database word (`V1`) or its address (`V2`).
const XR_DATABASE: u8 = 2;
/// Query seed.
const XR_Q_START: u8 = 3;
/// Database seed.
const XR_D_START: u8 = 4;
/// First result-address register (`V2`).
const XR_RESULT_ADDR: u8 = 5;
/// Number of registers.
const NUM_REGS: usize = 9;
/// Bytes per word moved to or from memory.
const WORD_BYTES: usize = 4;

/// How the accelerator obtains its database word and returns results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Database word in a register; results read back from registers.
    #[default]
    V1,
    /// Database word read from memory; results written to memory.
    V2,
}

impl Protocol {
    /// Highest register writable during setup.
    const fn max_setup_reg(self) -> u8 {
        match self {
            Self::V1 => XR_D_START,
            Self::V2 => XR_RESULT_ADDR + 3,
        }
    }

    /// Highest register readable while results are pending.
    const fn max_result_reg(self) -> u8 {
        match self {
            Self::V1 => XR_D_START,
            Self::V2 => XR_GO,
        }
    }
}

/// BLASTN accelerator state.
#[derive(Clone, Debug, Default)]
pub struct BlastnXcel {
    protocol: Protocol,
    extender: SeedExtender,
    regs: [u32; NUM_REGS],
    phase: XcelPhase,
    result: Alignment,
}

impl BlastnXcel {
    /// Creates an idle accelerator.
    pub fn new(protocol: Protocol, extender: SeedExtender) -> Self {
        Self {
            protocol,
            extender,
            ..Self::default()
        }
    }

    /// Protocol in use.
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Current handshake phase.
    pub const fn phase(&self) -> XcelPhase {
        self.phase
    }

    /// Result of the last completed run.
    pub const fn result(&self) -> &Alignment {
        &self.result
    }

    /// Serves one register access.
    ///
    /// Memory is only touched by a `V2` start, through `mem`.
    ///
    /// # Errors
    ///
    /// Returns [`XcelError::IllegalRegister`] for a register outside the set
    /// allowed in the current phase, [`XcelError::UnexpectedRequest`] for a
    /// read during setup or a write while results are pending, and the
    /// extension or memory error of a failed start. A failed request leaves
    /// the phase unchanged.
    pub fn handle<M: MemPort>(&mut self, req: XcelReq, mem: &mut M) -> Result<XcelResp, XcelError> {
        match (self.phase, req.kind) {
            (XcelPhase::Setup, XcelMsgType::Write) => {
                self.check_reg(req.addr, self.protocol.max_setup_reg())?;
                self.regs[req.addr as usize] = req.data;
                if req.addr == XR_GO {
                    self.start(mem)?;
                }
                Ok(XcelResp {
                    kind: XcelMsgType::Write,
                    data: 0,
                })
            }
            (XcelPhase::Results, XcelMsgType::Read) => {
                self.check_reg(req.addr, self.protocol.max_result_reg())?;
                let data = match req.addr {
                    XR_GO => {
                        self.phase = XcelPhase::Setup;
                        debug!(phase = %self.phase, "results collected");
                        1
                    }
                    XR_QUERY => self.result.score as u32,
                    XR_DATABASE => self.result.length as u32,
                    XR_Q_START => self.result.q_start as u32,
                    _ => self.result.d_start as u32,
                };
                Ok(XcelResp {
                    kind: XcelMsgType::Read,
                    data,
                })
            }
            (phase, kind) => {
                let kind = match kind {
                    XcelMsgType::Read => "read",
                    XcelMsgType::Write => "write",
                };
                warn!(%phase, kind, addr = req.addr, "unexpected accelerator request");
                Err(XcelError::UnexpectedRequest { kind, phase })
            }
        }
    }

    /// Runs a whole invocation: writes every operand, starts, and collects the results.
    ///
    /// For `V1` `database` is the packed word itself; for `V2` it is the word's
    /// address and `result_addrs` receive the four results.
    ///
    /// # Errors
    ///
    /// As for [`BlastnXcel::handle`].
    pub fn run<M: MemPort>(
        &mut self,
        mem: &mut M,
        query: u32,
        database: u32,
        seeds: (u32, u32),
        result_addrs: [u32; 4],
    ) -> Result<Alignment, XcelError> {
        let mut setup = vec![
            XcelReq::write(XR_QUERY, query),
            XcelReq::write(XR_DATABASE, database),
            XcelReq::write(XR_Q_START, seeds.0),
            XcelReq::write(XR_D_START, seeds.1),
        ];
        if self.protocol == Protocol::V2 {
            setup.extend(
                (XR_RESULT_ADDR..)
                    .zip(result_addrs)
                    .map(|(reg, addr)| XcelReq::write(reg, addr)),
            );
        }
        setup.push(XcelReq::write(XR_GO, 0));
        for req in setup {
            let _ = self.handle(req, mem)?;
        }

        let result = self.result;
        let _ = self.handle(XcelReq::read(XR_GO), mem)?;
        Ok(result)
    }

    fn check_reg(&self, addr: u8, max: u8) -> Result<(), XcelError> {
        if addr > max {
            warn!(addr, phase = %self.phase, "illegal accelerator register");
            return Err(XcelError::IllegalRegister {
                addr,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn start<M: MemPort>(&mut self, mem: &mut M) -> Result<(), XcelError> {
        let query = self.regs[XR_QUERY as usize];
        let q_start = self.regs[XR_Q_START as usize] as usize;
        let d_start = self.regs[XR_D_START as usize] as usize;

        let database = match self.protocol {
            Protocol::V1 => self.regs[XR_DATABASE as usize],
            Protocol::V2 => mem.mem_read(self.regs[XR_DATABASE as usize], WORD_BYTES)? as u32,
        };

        let result = self
            .extender
            .extend_packed(query, database, q_start, d_start)?;

        if self.protocol == Protocol::V2 {
            let values = [
                result.score as u32,
                result.length as u32,
                result.q_start as u32,
                result.d_start as u32,
            ];
            let base = XR_RESULT_ADDR as usize;
            for (addr, value) in self.regs[base..].iter().zip(values) {
                mem.mem_write(*addr, WORD_BYTES, u128::from(value))?;
            }
        }

        self.result = result;
        self.phase = XcelPhase::Results;
        debug!(
            protocol = ?self.protocol,
            score = result.score,
            length = result.length,
            "accelerator run complete"
        );
        Ok(())
    }
}
