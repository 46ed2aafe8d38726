//! Cache Replacement Policies.
//!
//! Selects which way of a set is evicted on a miss. The cache engine only
//! depends on the [`ReplacementPolicy`] trait; the reference design uses
//! [`LruPolicy`].

/// Least Recently Used replacement policy.
pub mod lru;

pub use lru::LruPolicy;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the policy state when a way is accessed or refilled.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Selects the way to evict from `set`.
    fn victim(&self, set: usize) -> usize;

    /// Usage order of `set`, most recently used first.
    fn order(&self, set: usize) -> &[usize];
}
