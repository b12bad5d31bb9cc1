//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// A single cached value with the metadata needed to decide its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now`.
    pub fn new(value: V, now: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            created_at: now,
            ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is logically absent once `now - created_at > ttl_ms`; at exactly
    /// `ttl_ms` elapsed it is still served.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) > self.ttl_ms
    }

    // == Expires At ==
    /// Last instant (Unix ms) at which the entry is still served.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at().saturating_sub(now)
    }
}
