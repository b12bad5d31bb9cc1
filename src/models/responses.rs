//! Response DTOs for the sidecar API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::limiter::{RateLimitStatus, TrafficClass};
use crate::protection::{AbuseVerdict, AccessDecision, ActivityReport, ActivitySnapshot, DenyReason};

/// Renders a Unix-millisecond deadline as RFC 3339.
fn format_deadline(ms: u64) -> Option<String> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
}

/// Response body for POST /admission
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionResponse {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    pub remaining_requests: u32,
    /// Cooldown deadline in RFC 3339
    pub blocked_until: Option<String>,
}

impl From<AccessDecision> for AdmissionResponse {
    fn from(decision: AccessDecision) -> Self {
        Self {
            allowed: decision.allowed,
            reason: decision.reason,
            remaining_requests: decision.status.remaining_requests,
            blocked_until: decision.status.blocked_until.and_then(format_deadline),
        }
    }
}

/// Response body for GET /rate-limit/:traffic/:identifier
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResponse {
    pub identifier: String,
    pub traffic: TrafficClass,
    pub is_allowed: bool,
    pub remaining_requests: u32,
    pub blocked_until: Option<String>,
}

impl RateLimitResponse {
    pub fn new(identifier: impl Into<String>, traffic: TrafficClass, status: RateLimitStatus) -> Self {
        Self {
            identifier: identifier.into(),
            traffic,
            is_allowed: status.is_allowed,
            remaining_requests: status.remaining_requests,
            blocked_until: status.blocked_until.and_then(format_deadline),
        }
    }
}

/// Response body for the activity endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub session: String,
    #[serde(flatten)]
    pub snapshot: ActivitySnapshot,
    pub verdict: AbuseVerdict,
    pub terminated: bool,
}

impl ActivityResponse {
    pub fn from_report(session: impl Into<String>, report: ActivityReport) -> Self {
        Self {
            session: session.into(),
            snapshot: report.snapshot,
            verdict: report.verdict,
            terminated: report.terminated,
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    /// Live entries in the cache
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for POST /cache/invalidate and DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Sanitized message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
