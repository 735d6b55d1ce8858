//! Measured size cache keyed by item key.
//!
//! Sizes survive scrolling and reordering: an item keeps its measured size
//! for as long as its key exists, wherever it moves. Nothing is evicted
//! implicitly; callers clear the cache when the content changes shape (for
//! example after a width change that reflows every row).

use std::collections::HashMap;
use std::hash::Hash;

/// Hit/miss statistics of a [`SizeCache`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of measured keys.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell back to the estimate.
    pub misses: u64,
    /// Hit rate as a fraction (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Key → last measured size.
#[derive(Debug, Clone)]
pub struct SizeCache<K> {
    entries: HashMap<K, u32>,
    hits: u64,
    misses: u64,
}

impl<K> Default for SizeCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Eq + Hash> SizeCache<K> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, counting the hit or miss.
    pub fn lookup(&mut self, key: &K) -> Option<u32> {
        match self.entries.get(key) {
            Some(&size) => {
                self.hits += 1;
                Some(size)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up `key` without touching the statistics.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<u32> {
        self.entries.get(key).copied()
    }

    /// Record a measurement; returns the previous one.
    pub fn insert(&mut self, key: K, size: u32) -> Option<u32> {
        self.entries.insert(key, size)
    }

    /// Forget one key.
    pub fn remove(&mut self, key: &K) -> Option<u32> {
        self.entries.remove(key)
    }

    /// Whether `key` has been measured.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Forget every measurement.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of measured keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been measured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total > 0 {
                self.hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Zero the hit/miss counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_counts_hits_and_misses() {
        let mut cache = SizeCache::new();
        cache.insert("a", 52);
        assert_eq!(cache.lookup(&"a"), Some(52));
        assert_eq!(cache.lookup(&"b"), None);
        assert_eq!(cache.lookup(&"a"), Some(52));
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn peek_is_free() {
        let mut cache = SizeCache::new();
        cache.insert(1u64, 10);
        assert_eq!(cache.peek(&1), Some(10));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn insert_replaces() {
        let mut cache = SizeCache::new();
        assert_eq!(cache.insert('k', 10), None);
        assert_eq!(cache.insert('k', 12), Some(10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_and_reset() {
        let mut cache = SizeCache::new();
        cache.insert(1, 1);
        let _ = cache.lookup(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn remove_forgets() {
        let mut cache = SizeCache::new();
        cache.insert("x", 3);
        assert!(cache.contains(&"x"));
        assert_eq!(cache.remove(&"x"), Some(3));
        assert!(!cache.contains(&"x"));
    }
}
