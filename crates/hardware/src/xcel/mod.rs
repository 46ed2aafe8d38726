//! Accelerator Register Front End.
//!
//! This module models how a processor drives the seed-extension accelerator.
//! It provides:
//! 1. **Messages:** Register read/write requests and their responses.
//! 2. **Phases:** The setup/results handshake every invocation walks through.
//! 3. **Accelerator:** [`BlastnXcel`], with register-result and memory-result protocols.

/// BLASTN seed-extension accelerator.
pub mod blastn;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use blastn::{BlastnXcel, Protocol};

/// Kind of an accelerator register access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum XcelMsgType {
    /// Register read.
    Read,
    /// Register write.
    Write,
}

impl fmt::Display for XcelMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "rd"),
            Self::Write => write!(f, "wr"),
        }
    }
}

/// Register access from the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct XcelReq {
    /// Read or write.
    pub kind: XcelMsgType,
    /// Register number (`xr0`, `xr1`, ...).
    pub addr: u8,
    /// Value to write; ignored on reads.
    pub data: u32,
}

impl XcelReq {
    /// Register read request.
    pub const fn read(addr: u8) -> Self {
        Self {
            kind: XcelMsgType::Read,
            addr,
            data: 0,
        }
    }

    /// Register write request.
    pub const fn write(addr: u8, data: u32) -> Self {
        Self {
            kind: XcelMsgType::Write,
            addr,
            data,
        }
    }
}

/// Response to an [`XcelReq`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct XcelResp {
    /// Echo of the request kind.
    pub kind: XcelMsgType,
    /// Register value on reads, 0 on writes.
    pub data: u32,
}

/// Position in the accelerator handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum XcelPhase {
    /// Accepting operand writes; a write to `xr0` starts the computation.
    #[default]
    Setup,
    /// Results are ready; reading `xr0` returns to setup.
    Results,
}

impl fmt::Display for XcelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Results => write!(f, "results"),
        }
    }
}
