//! Memory request and response messages.
//!
//! These mirror the wire format between a client and the cache: an 8-bit
//! opaque field echoed back untouched, a 32-bit address, a 4-bit length where
//! `0` encodes a full 16-byte transfer, and a 128-bit data field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::constants::MAX_ACCESS_BYTES;

/// Kind of memory transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MemMsgType {
    /// Read `len` bytes.
    Read,
    /// Write `len` bytes.
    Write,
    /// Preload memory; the hit flag of the response carries no meaning.
    WriteInit,
}

impl fmt::Display for MemMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "rd",
            Self::Write => "wr",
            Self::WriteInit => "in",
        };
        f.write_str(name)
    }
}

/// Decodes a wire length field: `0` stands for a full 16-byte transfer.
#[inline]
pub const fn decode_len(len: u8) -> usize {
    if len == 0 {
        MAX_ACCESS_BYTES
    } else {
        len as usize
    }
}

/// Encodes a byte count into the 4-bit wire length field.
#[inline]
pub const fn encode_len(len: usize) -> u8 {
    (len % MAX_ACCESS_BYTES) as u8
}

/// A memory request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemReq {
    /// Transaction kind.
    pub kind: MemMsgType,
    /// Echoed back in the response.
    pub opaque: u8,
    /// Byte address.
    pub addr: u32,
    /// Wire length (`0` = 16 bytes).
    pub len: u8,
    /// Write data, least-significant byte at `addr`.
    pub data: u128,
}

impl MemReq {
    /// Builds a read request.
    pub const fn read(opaque: u8, addr: u32, len: u8) -> Self {
        Self {
            kind: MemMsgType::Read,
            opaque,
            addr,
            len,
            data: 0,
        }
    }

    /// Builds a write request.
    pub const fn write(opaque: u8, addr: u32, len: u8, data: u128) -> Self {
        Self {
            kind: MemMsgType::Write,
            opaque,
            addr,
            len,
            data,
        }
    }

    /// Builds a preload request.
    pub const fn write_init(opaque: u8, addr: u32, len: u8, data: u128) -> Self {
        Self {
            kind: MemMsgType::WriteInit,
            opaque,
            addr,
            len,
            data,
        }
    }

    /// Number of bytes this request transfers.
    #[inline]
    pub const fn byte_len(&self) -> usize {
        decode_len(self.len)
    }
}

impl fmt::Display for MemReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02x}:{:08x}:{:x}:{:032x}",
            self.kind, self.opaque, self.addr, self.len, self.data
        )
    }
}

/// A memory response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemResp {
    /// Transaction kind, copied from the request.
    pub kind: MemMsgType,
    /// Copied from the request.
    pub opaque: u8,
    /// `1` on a cache hit, `0` on a miss (always `0` for `WriteInit`).
    pub test: u8,
    /// Wire length, copied from the request.
    pub len: u8,
    /// Read data; zero for writes.
    pub data: u128,
}

impl MemResp {
    /// Builds a read response.
    pub const fn read(opaque: u8, test: u8, len: u8, data: u128) -> Self {
        Self {
            kind: MemMsgType::Read,
            opaque,
            test,
            len,
            data,
        }
    }

    /// Builds a write response.
    pub const fn write(opaque: u8, test: u8, len: u8) -> Self {
        Self {
            kind: MemMsgType::Write,
            opaque,
            test,
            len,
            data: 0,
        }
    }

    /// Compares every field except the hit flag.
    ///
    /// Models that do not track residency (and every `WriteInit` response)
    /// carry a meaningless `test` field, so checkers use this instead of `==`.
    pub fn eq_ignoring_test(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.opaque == other.opaque
            && self.len == other.len
            && self.data == other.data
    }
}

impl fmt::Display for MemResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02x}:{}:{:x}:{:032x}",
            self.kind, self.opaque, self.test, self.len, self.data
        )
    }
}
