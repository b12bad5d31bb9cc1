//! Dash Shield - protective layer for an admin dashboard
//!
//! TTL caching with pattern invalidation, per-identifier rate limiting,
//! retry with backoff, and suspicious-activity escalation.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod protection;
pub mod retry;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use retry::{with_retry, RetryOptions};
pub use tasks::{spawn_cleanup_task, spawn_session_sweep_task};
