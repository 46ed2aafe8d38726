//! # Cache Engine Tests
//!
//! Hit/miss decisions, refill, LRU eviction, write-through, and sub-word data
//! movement of `CacheEngine`, both through the typed API and through wire
//! transactions.

use std::sync::{Arc, Mutex};
use std::thread;

use blastn_xcel_core::common::CacheError;
use blastn_xcel_core::config::CacheConfig;
use blastn_xcel_core::mem::{MemMsgType, MemReq, MemResp, SparseMemory};
use blastn_xcel_core::stats::CacheStats;
use pretty_assertions::assert_eq;

use crate::common::harness::{cache, cache_with, run_transactions, set_stride, warnings_during};

fn init_resp(opaque: u8, len: u8) -> MemResp {
    MemResp {
        kind: MemMsgType::WriteInit,
        opaque,
        test: 0,
        len,
        data: 0,
    }
}

/// 64 bytes of sequential data at 0x1000.
fn data_64b() -> SparseMemory {
    let words: Vec<(u32, u32)> = (0..16u32)
        .map(|i| {
            let b = (4 * i) as u8;
            (0x1000 + 4 * i, u32::from_le_bytes([b, b + 1, b + 2, b + 3]))
        })
        .collect();
    SparseMemory::from_words(&words)
}

/// write 0xAABBCCDD at 0x1000, read it back as a word and as its low byte.
#[test]
fn write_then_read_word_and_byte() {
    let mut c = cache(2);
    assert!(!c.write(0x1000, 4, 0xaabb_ccdd).unwrap());

    let word = c.read(0x1000, 4).unwrap();
    assert_eq!(word.data, 0xaabb_ccdd);
    assert!(word.hit);

    let byte = c.read(0x1000, 1).unwrap();
    assert_eq!(byte.data, 0xdd);
    assert!(byte.hit);
}

#[test]
fn write_miss_still_writes_through() {
    let mut c = cache(2);
    let _ = c.write(0x2468, 4, 0x0102_0304).unwrap();
    assert_eq!(c.store().load_word(0x2468), 0x0102_0304);
    // Neighbouring bytes of the line are not written.
    assert_eq!(c.store().len(), 4);
}

#[test]
fn write_hit_writes_through() {
    let mut c = cache(2);
    let _ = c.read(0x1000, 4).unwrap();
    assert!(c.write(0x1004, 2, 0xbeef).unwrap());
    assert_eq!(c.store().load(0x1004, 2), 0xbeef);
}

#[test]
fn read_miss_refills_whole_line() {
    let mut c = cache_with(CacheConfig::default(), data_64b());

    let first = c.read(0x1004, 4).unwrap();
    assert!(!first.hit);
    assert_eq!(first.data, 0x0706_0504);

    // The rest of the line arrived with the refill.
    let rest = c.read(0x100c, 4).unwrap();
    assert!(rest.hit);
    assert_eq!(rest.data, 0x0f0e_0d0c);

    let full = c.read(0x1000, 16).unwrap();
    assert!(full.hit);
    assert_eq!(full.data, 0x0f0e_0d0c_0b0a_0908_0706_0504_0302_0100);

    // Next line is a separate miss.
    assert!(!c.read(0x1010, 4).unwrap().hit);
}

/// Writing `ways + 1` lines of one set evicts the first; reading it again
/// misses and returns the value held by memory.
#[test]
fn eviction_reads_back_from_memory() {
    for ways in [1usize, 2] {
        let mut c = cache(ways);
        let stride = set_stride(&c);
        let addrs: Vec<u32> = (0..=ways as u32).map(|i| 0x1000 + i * stride).collect();

        for (i, &addr) in addrs.iter().enumerate() {
            assert!(!c.write(addr, 4, 0x100 + i as u128).unwrap());
        }
        assert!(!c.is_resident(addrs[0]));

        let first = c.read(addrs[0], 4).unwrap();
        assert!(!first.hit, "ways = {ways}");
        assert_eq!(first.data, 0x100);
    }
}

/// Initial LRU order is `[0, 1]`, so way 1 fills first.
#[test]
fn two_way_lru_replacement_order() {
    let mut c = cache(2);
    let stride = set_stride(&c);
    let (a, b, d) = (0x1000, 0x1000 + stride, 0x1000 + 2 * stride);
    let set = c.layout().split(a).index;

    assert_eq!(c.lru_order(set), &[0, 1]);

    let _ = c.read(a, 4).unwrap();
    assert_eq!(c.lru_order(set), &[1, 0]);
    assert_eq!(c.tag_at(set, 1), Some(c.layout().split(a).tag));
    assert_eq!(c.tag_at(set, 0), None);

    let _ = c.read(b, 4).unwrap();
    assert_eq!(c.lru_order(set), &[0, 1]);

    // Touch `a`, so `b` becomes LRU and is the victim for `d`.
    assert!(c.read(a, 4).unwrap().hit);
    let _ = c.read(d, 4).unwrap();
    assert!(c.is_resident(a));
    assert!(!c.is_resident(b));
    assert!(c.is_resident(d));
    assert_eq!(c.tag_at(set, 0), Some(c.layout().split(d).tag));
}

#[test]
fn direct_mapped_conflicts_always_miss() {
    let mut c = cache(1);
    let stride = set_stride(&c);
    for _ in 0..4 {
        assert!(!c.read(0x1000, 4).unwrap().hit);
        assert!(!c.read(0x1000 + stride, 4).unwrap().hit);
    }
    assert_eq!(c.stats().misses, 8);
    assert_eq!(c.stats().evictions, 7);
}

#[test]
fn is_resident_does_not_touch_lru() {
    let mut c = cache(2);
    let stride = set_stride(&c);
    let _ = c.read(0x1000, 4).unwrap();
    let _ = c.read(0x1000 + stride, 4).unwrap();
    let set = c.layout().split(0x1000).index;
    let before = c.lru_order(set).to_vec();
    assert!(c.is_resident(0x1000));
    assert_eq!(c.lru_order(set), before.as_slice());
}

#[test]
fn write_init_is_not_counted() {
    let mut c = cache(2);
    c.write_init(0x1000, 4, 0xdead_beef).unwrap();
    assert_eq!(c.stats().write_inits, 1);
    assert_eq!(c.stats().hits + c.stats().misses, 0);
    assert_eq!(c.store().load_word(0x1000), 0xdead_beef);

    // The preload allocated the line.
    assert!(c.read(0x1000, 4).unwrap().hit);
}

#[test]
fn invalidate_all_keeps_data() {
    let mut c = cache(2);
    let _ = c.write(0x1000, 4, 0x1234).unwrap();
    c.invalidate_all();
    let r = c.read(0x1000, 4).unwrap();
    assert!(!r.hit);
    assert_eq!(r.data, 0x1234);
}

#[test]
fn malformed_access_changes_nothing() {
    let mut c = cache(2);
    assert_eq!(
        c.read(0x100e, 4),
        Err(CacheError::Range {
            offset: 14,
            len: 4,
            line_bytes: 16
        })
    );
    assert_eq!(c.write(0x1000, 3, 0), Err(CacheError::InvalidLength(3)));
    assert!(!c.is_resident(0x1000));
    assert_eq!(*c.stats(), CacheStats::default());
    assert!(c.store().is_empty());
}

#[test]
fn malformed_access_is_logged() {
    let mut c = cache(2);
    let (_, warnings) = warnings_during(|| {
        let _ = c.read(0x100e, 4);
        let _ = c.write_init(0x1000, 5, 0);
    });
    assert_eq!(warnings, 2);

    let (_, warnings) = warnings_during(|| c.read(0x1000, 4));
    assert_eq!(warnings, 0);
}

#[test]
fn stats_track_refills_and_evictions() {
    let mut c = cache(2);
    let stride = set_stride(&c);
    for i in 0..3 {
        let _ = c.write(0x1000 + i * stride, 4, 0).unwrap();
    }
    let _ = c.read(0x1000 + 2 * stride, 4).unwrap();

    let s = c.stats();
    assert_eq!((s.reads, s.writes), (1, 3));
    assert_eq!((s.hits, s.misses), (1, 3));
    assert_eq!(s.refills, 3);
    assert_eq!(s.evictions, 1);
}

/// Preload one line with four words, then read every byte of it.
#[test]
fn read_hit_cacheline_byte() {
    let words = [0xdead_beef_u128, 0xcafe_efac, 0xc0ff_ee00, 0xabcd_ef02];
    let mut msgs = Vec::new();
    for (i, &w) in words.iter().enumerate() {
        let opaque = i as u8;
        msgs.push((
            MemReq::write_init(opaque, 0x1000 + 4 * i as u32, 4, w),
            init_resp(opaque, 4),
        ));
    }
    for byte in 0..16u32 {
        let opaque = 4 + byte as u8;
        let value = (words[(byte / 4) as usize] >> (8 * (byte % 4))) & 0xff;
        msgs.push((
            MemReq::read(opaque, 0x1000 + byte, 1),
            MemResp::read(opaque, 1, 1, value),
        ));
    }

    let mut c = cache(2);
    run_transactions(&mut c, &msgs, true);
}

#[test]
fn read_hit_halfword_and_byte() {
    let mut c = cache(2);
    run_transactions(
        &mut c,
        &[
            (MemReq::write_init(0, 0x1000, 4, 0xdead_beef), init_resp(0, 4)),
            (MemReq::read(1, 0x1000, 1), MemResp::read(1, 1, 1, 0xef)),
            (MemReq::read(2, 0x1000, 2), MemResp::read(2, 1, 2, 0xbeef)),
            (MemReq::read(3, 0x1002, 2), MemResp::read(3, 1, 2, 0xdead)),
        ],
        true,
    );
}

/// Byte writes to a resident word merge into it.
#[test]
fn write_hit_bytes_merge() {
    let mut c = cache(2);
    run_transactions(
        &mut c,
        &[
            (MemReq::write_init(0, 0x1000, 4, 0xdead_beef), init_resp(0, 4)),
            (MemReq::write(1, 0x1000, 1, 0xaa), MemResp::write(1, 1, 1)),
            (MemReq::write(2, 0x1003, 1, 0x11), MemResp::write(2, 1, 1)),
            (MemReq::read(3, 0x1000, 4), MemResp::read(3, 1, 4, 0x11ad_beaa)),
        ],
        true,
    );
    assert_eq!(c.store().load_word(0x1000), 0x11ad_beaa);
}

/// Wire length 0 moves a whole 16-byte line.
#[test]
fn zero_length_is_full_line() {
    let line = 0x0f0e_0d0c_0b0a_0908_0706_0504_0302_0100_u128;
    let mut c = cache(2);
    run_transactions(
        &mut c,
        &[
            (MemReq::write(0, 0x2000, 0, line), MemResp::write(0, 0, 0)),
            (MemReq::read(1, 0x2000, 0), MemResp::read(1, 1, 0, line)),
            (MemReq::read(2, 0x2008, 8), MemResp::read(2, 1, 8, line >> 64)),
        ],
        true,
    );
}

/// Evicting a line after byte writes: the refilled line carries the written bytes.
#[test]
fn evict_byte_round_trip() {
    let mut c = cache(2);
    let stride = set_stride(&c);
    run_transactions(
        &mut c,
        &[
            (MemReq::write(0, 0x1001, 1, 0xab), MemResp::write(0, 0, 1)),
            (MemReq::write(1, 0x1000 + stride, 4, 1), MemResp::write(1, 0, 4)),
            (MemReq::write(2, 0x1000 + 2 * stride, 4, 2), MemResp::write(2, 0, 4)),
            (MemReq::read(3, 0x1000, 4), MemResp::read(3, 0, 4, 0xab00)),
        ],
        true,
    );
}

/// One lock around each call is enough to share a cache between threads.
#[test]
fn shared_behind_a_mutex() {
    let c = Arc::new(Mutex::new(cache(2)));
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                for i in 0..64u32 {
                    let addr = 0x4000 * t + 4 * i;
                    let _ = c.lock().unwrap().write(addr, 4, u128::from(addr)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut c = c.lock().unwrap();
    for t in 0..4u32 {
        for i in 0..64u32 {
            let addr = 0x4000 * t + 4 * i;
            assert_eq!(c.read(addr, 4).unwrap().data, u128::from(addr));
        }
    }
}
