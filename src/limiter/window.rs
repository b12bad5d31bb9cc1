//! Rate Limiter Module
//!
//! Per-identifier resetting-window counter with a block/cooldown state machine.
//!
//! An identifier moves through three states:
//! - no entry: the first check opens a window with `count = 1`
//! - counting: checks increment the count; an elapsed window restarts at 1;
//!   exceeding `max_requests` blocks the identifier for `block_duration_ms`
//! - blocked: checks are refused until the cooldown passes, after which the
//!   next check opens a fresh window
//!
//! The window resets rather than slides, so bursts straddling a boundary can
//! exceed the nominal rate.

use std::collections::HashMap;

use serde::Serialize;

use crate::clock::SharedClock;
use crate::limiter::{RateLimitConfig, RateLimitEntry};

// == Rate Limit Status ==
/// Outcome of a counted check, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub is_allowed: bool,
    pub remaining_requests: u32,
    /// Cooldown deadline (Unix ms) while blocked
    pub blocked_until: Option<u64>,
}

// == Rate Limiter ==
/// Rate limiter for one traffic class.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: HashMap<String, RateLimitEntry>,
    clock: SharedClock,
}

impl RateLimiter {
    /// Creates a limiter with the given thresholds.
    pub fn new(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // == Is Allowed ==
    /// Counts one request for `identifier` and decides whether it may proceed.
    ///
    /// This is not idempotent: every call advances the window.
    pub fn is_allowed(&mut self, identifier: &str) -> bool {
        let now = self.clock.now_ms();
        let config = self.config;

        let Some(entry) = self.entries.get_mut(identifier) else {
            self.entries
                .insert(identifier.to_string(), RateLimitEntry::fresh(now));
            return true;
        };

        if entry.blocked {
            if entry.cooldown_elapsed(now) {
                *entry = RateLimitEntry::fresh(now);
                return true;
            }
            return false;
        }

        if entry.window_elapsed(now, config.window_ms) {
            *entry = RateLimitEntry::fresh(now);
            return true;
        }

        entry.count = entry.count.saturating_add(1);
        if entry.count > config.max_requests {
            entry.block(now.saturating_add(config.block_duration_ms));
            return false;
        }

        true
    }

    // == Remaining Requests ==
    /// Requests left in the current window. Does not count as a request.
    pub fn remaining_requests(&self, identifier: &str) -> u32 {
        match self.entries.get(identifier) {
            Some(entry) => self.config.max_requests.saturating_sub(entry.count),
            None => self.config.max_requests,
        }
    }

    // == Blocked Until ==
    /// Cooldown deadline if `identifier` is currently blocked. Does not count
    /// as a request.
    pub fn blocked_until(&self, identifier: &str) -> Option<u64> {
        let now = self.clock.now_ms();
        self.entries
            .get(identifier)
            .filter(|entry| entry.blocked && !entry.cooldown_elapsed(now))
            .and_then(|entry| entry.blocked_until)
    }

    // == Check ==
    /// Counts a request and reports the resulting status.
    pub fn check(&mut self, identifier: &str) -> RateLimitStatus {
        let is_allowed = self.is_allowed(identifier);
        RateLimitStatus {
            is_allowed,
            remaining_requests: self.remaining_requests(identifier),
            blocked_until: self.blocked_until(identifier),
        }
    }

    // == Peek ==
    /// Reports the status of `identifier` without counting a request.
    ///
    /// `is_allowed` answers whether the next request would be admitted.
    pub fn peek(&self, identifier: &str) -> RateLimitStatus {
        let blocked_until = self.blocked_until(identifier);
        RateLimitStatus {
            is_allowed: blocked_until.is_none(),
            remaining_requests: self.remaining_requests(identifier),
            blocked_until,
        }
    }

    /// Number of identifiers seen so far.
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}
