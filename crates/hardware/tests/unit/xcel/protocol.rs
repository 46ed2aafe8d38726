//! # Accelerator Protocol Tests
//!
//! Register handshakes of both protocols, results written through memory and
//! through the cache, and rejection of out-of-phase or out-of-range accesses.

use blastn_xcel_core::align::{Alignment, pack};
use blastn_xcel_core::common::{CacheError, ExtendError, XcelError};
use blastn_xcel_core::mem::SparseMemory;
use blastn_xcel_core::xcel::{Protocol, XcelMsgType, XcelPhase, XcelReq, XcelResp};
use blastn_xcel_core::{BlastnXcel, SeedExtender};
use pretty_assertions::assert_eq;

use crate::common::harness::{cache, init_tracing, symbols};

const RESULT_ADDRS: [u32; 4] = [0x3000, 0x3004, 0x3008, 0x300c];

fn words() -> (u32, u32) {
    (
        pack(&symbols("ACGTACGTTTGACCAG")),
        pack(&symbols("ACGTACGTATGACCAG")),
    )
}

fn xcel(protocol: Protocol) -> BlastnXcel {
    init_tracing();
    BlastnXcel::new(protocol, SeedExtender::default())
}

fn write(x: &mut BlastnXcel, mem: &mut SparseMemory, addr: u8, data: u32) {
    let resp = x.handle(XcelReq::write(addr, data), mem).unwrap();
    assert_eq!(
        resp,
        XcelResp {
            kind: XcelMsgType::Write,
            data: 0,
        }
    );
}

fn read(x: &mut BlastnXcel, mem: &mut SparseMemory, addr: u8) -> u32 {
    let resp = x.handle(XcelReq::read(addr), mem).unwrap();
    assert_eq!(resp.kind, XcelMsgType::Read);
    resp.data
}

#[test]
fn v1_register_handshake() {
    let (query, database) = words();
    let expected = SeedExtender::default()
        .extend_packed(query, database, 5, 5)
        .unwrap();
    let mut x = xcel(Protocol::V1);
    let mut mem = SparseMemory::new();

    write(&mut x, &mut mem, 1, query);
    write(&mut x, &mut mem, 2, database);
    write(&mut x, &mut mem, 3, 5);
    write(&mut x, &mut mem, 4, 5);
    assert_eq!(x.phase(), XcelPhase::Setup);
    write(&mut x, &mut mem, 0, 0);
    assert_eq!(x.phase(), XcelPhase::Results);

    assert_eq!(read(&mut x, &mut mem, 1), expected.score as u32);
    assert_eq!(read(&mut x, &mut mem, 2), expected.length as u32);
    assert_eq!(read(&mut x, &mut mem, 3), expected.q_start as u32);
    assert_eq!(read(&mut x, &mut mem, 4), expected.d_start as u32);
    assert_eq!(read(&mut x, &mut mem, 0), 1);
    assert_eq!(x.phase(), XcelPhase::Setup);
    assert_eq!(*x.result(), expected);
    assert!(mem.is_empty());
}

#[test]
fn v1_run_all_match() {
    let mut x = xcel(Protocol::V1);
    let result = x
        .run(&mut SparseMemory::new(), 0, 0, (8, 8), [0; 4])
        .unwrap();
    assert_eq!(
        result,
        Alignment {
            score: 16,
            length: 16,
            q_start: 0,
            d_start: 0,
        }
    );
    assert_eq!(x.protocol(), Protocol::V1);
}

#[test]
fn back_to_back_runs() {
    let mut x = xcel(Protocol::V1);
    let mut mem = SparseMemory::new();
    let first = x.run(&mut mem, 0, 0, (8, 8), [0; 4]).unwrap();
    let second = x.run(&mut mem, 0, u32::MAX, (8, 8), [0; 4]).unwrap();
    assert_eq!(first.score, 16);
    assert_eq!(second.score, 0);
    assert_eq!(second.length, 0);
}

#[test]
fn v2_results_land_in_memory() {
    let (query, database) = words();
    let expected = SeedExtender::default()
        .extend_packed(query, database, 3, 3)
        .unwrap();
    let mut mem = SparseMemory::from_words(&[(0x2000, database)]);
    let mut x = xcel(Protocol::V2);

    let result = x.run(&mut mem, query, 0x2000, (3, 3), RESULT_ADDRS).unwrap();
    assert_eq!(result, expected);
    assert_eq!(mem.load_word(0x3000), expected.score as u32);
    assert_eq!(mem.load_word(0x3004), expected.length as u32);
    assert_eq!(mem.load_word(0x3008), expected.q_start as u32);
    assert_eq!(mem.load_word(0x300c), expected.d_start as u32);
}

#[test]
fn v2_through_cache() {
    let (query, database) = words();
    let mut engine = cache(2);
    engine.store_mut().store_word(0x2000, database);
    let mut x = xcel(Protocol::V2);

    let result = x
        .run(&mut engine, query, 0x2000, (3, 3), RESULT_ADDRS)
        .unwrap();
    assert!(engine.is_resident(0x2000));
    assert!(engine.is_resident(0x3000));
    assert_eq!(engine.store().load_word(0x3000), result.score as u32);
    assert_eq!(engine.store().load_word(0x300c), result.d_start as u32);
    assert_eq!(engine.stats().reads, 1);
    assert_eq!(engine.stats().writes, 4);
    assert_eq!(engine.stats().hits, 3);
}

#[test]
fn v1_rejects_memory_registers() {
    let mut x = xcel(Protocol::V1);
    let err = x
        .handle(XcelReq::write(5, 0x3000), &mut SparseMemory::new())
        .unwrap_err();
    assert!(matches!(
        err,
        XcelError::IllegalRegister {
            addr: 5,
            phase: XcelPhase::Setup
        }
    ));
}

#[test]
fn v2_only_returns_status() {
    let mut mem = SparseMemory::new();
    let mut x = xcel(Protocol::V2);
    for (reg, value) in [(1, 0), (2, 0x2000), (3, 0), (4, 0)] {
        write(&mut x, &mut mem, reg, value);
    }
    write(&mut x, &mut mem, 0, 0);

    let err = x.handle(XcelReq::read(1), &mut mem).unwrap_err();
    assert!(matches!(
        err,
        XcelError::IllegalRegister {
            addr: 1,
            phase: XcelPhase::Results
        }
    ));
    assert_eq!(x.phase(), XcelPhase::Results);
    assert_eq!(read(&mut x, &mut mem, 0), 1);
}

#[test]
fn out_of_phase_requests() {
    let mut mem = SparseMemory::new();
    let mut x = xcel(Protocol::V1);
    let err = x.handle(XcelReq::read(0), &mut mem).unwrap_err();
    assert!(matches!(
        err,
        XcelError::UnexpectedRequest {
            kind: "read",
            phase: XcelPhase::Setup
        }
    ));

    write(&mut x, &mut mem, 0, 0);
    let err = x.handle(XcelReq::write(1, 7), &mut mem).unwrap_err();
    assert!(matches!(
        err,
        XcelError::UnexpectedRequest {
            kind: "write",
            phase: XcelPhase::Results
        }
    ));
    assert_eq!(err.to_string(), "unexpected write request during results");
}

#[test]
fn failed_start_stays_in_setup() {
    let mut mem = SparseMemory::new();
    let mut x = xcel(Protocol::V1);
    write(&mut x, &mut mem, 3, 17);
    let err = x.handle(XcelReq::write(0, 0), &mut mem).unwrap_err();
    assert!(matches!(
        err,
        XcelError::Extend(ExtendError::SeedOutOfRange { seed: 17, len: 16 })
    ));
    assert_eq!(x.phase(), XcelPhase::Setup);
}

#[test]
fn v2_memory_fault_propagates() {
    let mut engine = cache(2);
    let mut x = xcel(Protocol::V2);
    let err = x
        .run(&mut engine, 0, 0x200e, (0, 0), RESULT_ADDRS)
        .unwrap_err();
    assert!(matches!(err, XcelError::Memory(CacheError::Range { .. })));
    assert_eq!(x.phase(), XcelPhase::Setup);
}
