//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the way that has not been accessed for the longest time.
//! It keeps a usage stack per set. An accessed way moves to the top (Most
//! Recently Used position); the bottom of the stack is the victim.
//!
//! # Performance
//!
//! - `update()`: O(W) where W is the associativity
//! - `victim()`: O(1)
//! - Space: O(S × W) where S is the number of sets

use super::ReplacementPolicy;

/// LRU Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LruPolicy {
    /// One usage stack per set.
    /// Index 0 is MRU, last index is LRU.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// Every set starts as `[0, 1, .., ways - 1]`, so the highest way is the
    /// first victim.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Moves `way` to the MRU position of `set`, shifting the others down.
    fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// Returns the way at the bottom of the usage stack.
    fn victim(&self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }

    fn order(&self, set: usize) -> &[usize] {
        &self.usage[set]
    }
}
