//! Protection Module
//!
//! Admission control built on top of the cache, the limiters and the retry
//! policy: bot classification, suspicious-activity escalation and the
//! protected fetch path.

mod activity;
mod bot;
mod fetcher;
mod orchestrator;

pub use activity::{AbuseVerdict, ActivitySnapshot, ActivityThresholds, ActivityTracker};
pub use bot::{BotClassifier, BotSignal, RequestMeta, UserAgentClassifier};
pub use fetcher::ProtectedFetcher;
pub use orchestrator::{
    AccessDecision, AccessRequest, ActivityReport, DenyReason, LoggingTerminator,
    ProtectionOrchestrator, RouteKind, SessionTerminator,
};
