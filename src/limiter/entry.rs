//! Rate Limit Entry Module
//!
//! Per-identifier counting state.

use serde::{Deserialize, Serialize};

// == Rate Limit Config ==
/// Thresholds for one traffic class, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Cooldown applied once the window quota is exceeded
    pub block_duration_ms: u64,
}

impl RateLimitConfig {
    /// Defaults for general API calls.
    pub fn api() -> Self {
        Self {
            max_requests: 100,
            window_ms: 60_000,
            block_duration_ms: 5 * 60_000,
        }
    }

    /// Defaults for page navigations.
    pub fn page() -> Self {
        Self {
            max_requests: 30,
            window_ms: 60_000,
            block_duration_ms: 2 * 60_000,
        }
    }
}

// == Rate Limit Entry ==
/// Counting state for a single identifier.
///
/// `blocked == true` always comes with `blocked_until` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests counted in the current window
    pub count: u32,
    /// Start of the current window (Unix ms)
    pub window_start: u64,
    pub blocked: bool,
    /// End of the cooldown (Unix ms)
    pub blocked_until: Option<u64>,
}

impl RateLimitEntry {
    /// A new window holding its first request.
    pub fn fresh(now: u64) -> Self {
        Self {
            count: 1,
            window_start: now,
            blocked: false,
            blocked_until: None,
        }
    }

    /// Whether the window that started at `window_start` has elapsed.
    pub fn window_elapsed(&self, now: u64, window_ms: u64) -> bool {
        now.saturating_sub(self.window_start) > window_ms
    }

    /// Whether the cooldown has passed.
    pub fn cooldown_elapsed(&self, now: u64) -> bool {
        match self.blocked_until {
            Some(until) => now > until,
            None => true,
        }
    }

    pub fn block(&mut self, until: u64) {
        self.blocked = true;
        self.blocked_until = Some(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry() {
        let entry = RateLimitEntry::fresh(100);
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_start, 100);
        assert!(!entry.blocked);
        assert!(entry.blocked_until.is_none());
    }

    #[test]
    fn test_window_boundary() {
        let entry = RateLimitEntry::fresh(0);
        assert!(!entry.window_elapsed(1_000, 1_000));
        assert!(entry.window_elapsed(1_001, 1_000));
    }

    #[test]
    fn test_block_sets_deadline() {
        let mut entry = RateLimitEntry::fresh(0);
        entry.block(500);

        assert!(entry.blocked);
        assert_eq!(entry.blocked_until, Some(500));
        assert!(!entry.cooldown_elapsed(500));
        assert!(entry.cooldown_elapsed(501));
    }
}
