//! Cache Module
//!
//! Provides an in-memory cache with per-entry TTL and pattern invalidation.

mod entry;
mod keys;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use keys::{cache_key, CacheTier, TtlTiers};
pub use stats::CacheStats;
pub use store::TtlCache;
