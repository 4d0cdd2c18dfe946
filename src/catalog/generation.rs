//! Invalidation generations
//!
//! Every invalidation bumps a counter for the product's shard. A fetch
//! remembers the counter before it reads the store and compares it after its
//! cache write; a change means a mutation cleared the key in between, so the
//! snapshot just written may predate that mutation.
//!
//! Ids share shards, so an unrelated invalidation can also discard a
//! population. That costs one extra miss, never a stale hit.

use std::sync::atomic::{AtomicU64, Ordering};

const SHARDS: usize = 64;

#[derive(Debug)]
pub struct Generations {
    shards: Box<[AtomicU64]>,
}

impl Default for Generations {
    fn default() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    fn shard(&self, id: i64) -> &AtomicU64 {
        &self.shards[id.rem_euclid(SHARDS as i64) as usize]
    }

    /// Current generation for `id`
    pub fn current(&self, id: i64) -> u64 {
        self.shard(id).load(Ordering::SeqCst)
    }

    /// Marks `id` as invalidated. Must happen before the cache delete.
    pub fn bump(&self, id: i64) {
        self.shard(id).fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_changes_generation() {
        let generations = Generations::new();
        let before = generations.current(7);
        generations.bump(7);
        assert_ne!(generations.current(7), before);
    }

    #[test]
    fn test_negative_ids_map_to_a_shard() {
        let generations = Generations::new();
        generations.bump(-3);
        assert_eq!(generations.current(-3), 1);
    }

    #[test]
    fn test_other_shards_untouched() {
        let generations = Generations::new();
        generations.bump(1);
        assert_eq!(generations.current(2), 0);
        assert_eq!(generations.current(1 + SHARDS as i64), 1);
    }
}
