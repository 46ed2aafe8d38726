//! # Cache Invariant Properties
//!
//! Random access sequences over a handful of sets, checking after every
//! access that LRU stacks stay permutations, that no set holds a tag twice,
//! that hit flags agree with the oracle, and that writes read back.

use std::collections::HashSet;

use blastn_xcel_core::CacheEngine;
use blastn_xcel_core::cache::HitMissOracle;
use blastn_xcel_core::config::CacheConfig;
use blastn_xcel_core::mem::SparseMemory;
use proptest::prelude::*;

/// (is_write, address) confined to 4 sets and 6 tags of a 16-byte-line cache.
fn ops(max: usize) -> impl Strategy<Value = Vec<(bool, u32)>> {
    let addr = (0u32..4, 0u32..6, 0u32..4).prop_map(|(set, tag, word)| {
        // 8 KiB span covers every set of both geometries used below.
        tag * 0x2000 + set * 16 + word * 4
    });
    prop::collection::vec((any::<bool>(), addr), 1..max)
}

fn check_sets(c: &CacheEngine) -> Result<(), TestCaseError> {
    for set in 0..4 {
        let mut order = c.lru_order(set).to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..c.ways()).collect::<Vec<_>>());

        let tags: Vec<u32> = (0..c.ways()).filter_map(|w| c.tag_at(set, w)).collect();
        let unique: HashSet<_> = tags.iter().collect();
        prop_assert_eq!(unique.len(), tags.len());
    }
    Ok(())
}

proptest! {
    #[test]
    fn lru_stays_permutation_and_tags_unique(ways in prop::sample::select(vec![1usize, 2, 4]), ops in ops(200)) {
        let config = CacheConfig::new(8192, ways, 16);
        let mut c = CacheEngine::new(&config, SparseMemory::new()).unwrap();
        for (write, addr) in ops {
            if write {
                let _ = c.write(addr, 4, u128::from(addr)).unwrap();
            } else {
                let _ = c.read(addr, 4).unwrap();
            }
            check_sets(&c)?;
        }
    }

    #[test]
    fn hit_flags_match_oracle(ways in prop::sample::select(vec![1usize, 2]), ops in ops(300)) {
        let config = CacheConfig::new(8192, ways, 16);
        let mut c = CacheEngine::new(&config, SparseMemory::new()).unwrap();
        let mut oracle = HitMissOracle::from_config(&config).unwrap();
        for (write, addr) in ops {
            let hit = if write {
                c.write(addr, 4, 0).unwrap()
            } else {
                c.read(addr, 4).unwrap().hit
            };
            prop_assert_eq!(hit, oracle.access(addr), "addr {:#x}", addr);
        }
        for set in 0..4 {
            prop_assert_eq!(c.lru_order(set), oracle.lru(set));
        }
    }

    /// write(a, v) then read(a) returns v, whatever other lines were touched in between.
    #[test]
    fn write_then_read_returns_value(
        ways in prop::sample::select(vec![1usize, 2]),
        target in 0u32..0x1_0000,
        value: u32,
        noise in ops(50),
    ) {
        let target = target & !3;
        let config = CacheConfig::new(8192, ways, 16);
        let mut c = CacheEngine::new(&config, SparseMemory::new()).unwrap();

        let _ = c.write(target, 4, u128::from(value)).unwrap();
        for (write, addr) in noise {
            if addr & !0xf == target & !0xf {
                continue;
            }
            if write {
                let _ = c.write(addr, 4, 0xffff_ffff).unwrap();
            } else {
                let _ = c.read(addr, 4).unwrap();
            }
        }
        prop_assert_eq!(c.read(target, 4).unwrap().data, u128::from(value));
    }
}
