//! Cache Store Module
//!
//! Key/value storage with per-entry expiry plus exact-key and regex-pattern
//! invalidation.

use std::collections::HashMap;

use regex::Regex;

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::SharedClock;

// == TTL Cache ==
/// In-memory cache with per-entry TTL.
///
/// Keys are opaque strings built by callers (see [`crate::cache::cache_key`]);
/// the cache knows nothing about their structure. Operations never fail and
/// never return a value past its TTL.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL in milliseconds applied when `set` is given none
    default_ttl_ms: u64,
    clock: SharedClock,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache reading time from `clock`.
    pub fn new(clock: SharedClock, default_ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl_ms,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its expiry.
    ///
    /// # Arguments
    /// * `ttl_ms` - Optional TTL in milliseconds (uses the default if None)
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_ms: Option<u64>) {
        let now = self.clock.now_ms();
        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        self.entries.insert(key.into(), CacheEntry::new(value, now, ttl));
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry is removed on the way out and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.stats.record_miss();
        None
    }

    // == Invalidate ==
    /// Removes the exact `key`. Returns whether an entry was removed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_invalidations(1);
        }
        removed
    }

    // == Invalidate By Patterns ==
    /// Removes every key matched by at least one of `patterns`.
    ///
    /// Returns the number of removed entries; zero matches is not an error.
    pub fn invalidate_by_patterns(&mut self, patterns: &[Regex]) -> usize {
        if patterns.is_empty() {
            return 0;
        }

        let before = self.entries.len();
        self.entries
            .retain(|key, _| !patterns.iter().any(|pattern| pattern.is_match(key)));
        let removed = before - self.entries.len();

        self.stats.record_invalidations(removed);
        removed
    }

    // == Clear ==
    /// Removes all entries, returning how many live ones were dropped.
    ///
    /// Live entries count as invalidations; expired ones were already gone.
    pub fn clear(&mut self) -> usize {
        let removed = self.size();
        self.entries.clear();
        self.stats.record_invalidations(removed);
        removed
    }

    // == Size ==
    /// Number of live entries. Expired entries awaiting eviction are not counted.
    pub fn size(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    // == Is Empty ==
    /// True when no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    // == Purge Expired ==
    /// Eagerly removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.size());
        stats
    }
}
