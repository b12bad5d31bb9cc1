//! Configuration Module
//!
//! Handles loading the protective layer's tuning knobs from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::TtlTiers;
use crate::limiter::RateLimitConfig;
use crate::protection::ActivityThresholds;
use crate::retry::RetrySettings;

/// Server and policy configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Cache TTL tiers
    pub ttl_tiers: TtlTiers,
    /// Limiter for general API calls
    pub api_limit: RateLimitConfig,
    /// Limiter for page navigations
    pub page_limit: RateLimitConfig,
    /// Retry defaults for wrapped fetches
    pub retry: RetrySettings,
    /// Suspicious-activity thresholds
    pub activity: ActivityThresholds,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` (3000), `CLEANUP_INTERVAL` seconds (30)
    /// - `CACHE_DEFAULT_TTL_MS`, `CACHE_STATIC_TTL_MS`, `CACHE_PROFILE_TTL_MS`
    /// - `API_MAX_REQUESTS`, `API_WINDOW_MS`, `API_BLOCK_MS`
    /// - `PAGE_MAX_REQUESTS`, `PAGE_WINDOW_MS`, `PAGE_BLOCK_MS`
    /// - `RETRY_MAX_ATTEMPTS`, `RETRY_DELAY_MS`, `RETRY_BACKOFF`
    /// - `NAV_MAX_COUNT`, `NAV_WINDOW_MS`, `REQ_MAX_COUNT`, `REQ_WINDOW_MS`,
    ///   `ABUSE_SIGNOUT_COUNT`
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api = defaults.api_limit;
        let page = defaults.page_limit;
        let tiers = defaults.ttl_tiers;
        let retry = defaults.retry;
        let activity = defaults.activity;

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            ttl_tiers: TtlTiers {
                default_ms: env_or("CACHE_DEFAULT_TTL_MS", tiers.default_ms),
                static_ms: env_or("CACHE_STATIC_TTL_MS", tiers.static_ms),
                profile_ms: env_or("CACHE_PROFILE_TTL_MS", tiers.profile_ms),
            },
            api_limit: RateLimitConfig {
                max_requests: env_or("API_MAX_REQUESTS", api.max_requests),
                window_ms: env_or("API_WINDOW_MS", api.window_ms),
                block_duration_ms: env_or("API_BLOCK_MS", api.block_duration_ms),
            },
            page_limit: RateLimitConfig {
                max_requests: env_or("PAGE_MAX_REQUESTS", page.max_requests),
                window_ms: env_or("PAGE_WINDOW_MS", page.window_ms),
                block_duration_ms: env_or("PAGE_BLOCK_MS", page.block_duration_ms),
            },
            retry: RetrySettings {
                max_attempts: env_or("RETRY_MAX_ATTEMPTS", retry.max_attempts),
                delay_ms: env_or("RETRY_DELAY_MS", retry.delay_ms),
                backoff: env_or("RETRY_BACKOFF", retry.backoff),
            },
            activity: ActivityThresholds {
                navigation_max: env_or("NAV_MAX_COUNT", activity.navigation_max),
                navigation_window_ms: env_or("NAV_WINDOW_MS", activity.navigation_window_ms),
                request_max: env_or("REQ_MAX_COUNT", activity.request_max),
                request_window_ms: env_or("REQ_WINDOW_MS", activity.request_window_ms),
                sign_out_request_count: env_or(
                    "ABUSE_SIGNOUT_COUNT",
                    activity.sign_out_request_count,
                ),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            ttl_tiers: TtlTiers::default(),
            api_limit: RateLimitConfig::api(),
            page_limit: RateLimitConfig::page(),
            retry: RetrySettings::default(),
            activity: ActivityThresholds::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
