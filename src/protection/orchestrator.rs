//! Admission control for the dashboard.
//!
//! Combines bot classification, the per-class rate limiters and per-session
//! activity tracking. This is a deterrence layer for a cooperating client;
//! the backend enforces its own limits.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::SharedClock;
use crate::error::{Result, ShieldError};
use crate::limiter::{RateLimitConfig, RateLimitStatus, RateLimiter, TrafficClass};
use crate::protection::{
    AbuseVerdict, ActivitySnapshot, ActivityThresholds, ActivityTracker, BotClassifier,
    RequestMeta,
};

// == Route Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Requires a signed-in, human user
    Protected,
    Public,
}

// == Access Request ==
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// Per-session token used as the rate-limit identifier
    pub identifier: String,
    pub route: RouteKind,
    pub traffic: TrafficClass,
    pub meta: RequestMeta,
}

// == Decision ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    Bot { category: Option<String> },
    RateLimited,
    SessionTerminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    pub status: RateLimitStatus,
}

/// Activity state after an event, with the escalation it triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub snapshot: ActivitySnapshot,
    pub verdict: AbuseVerdict,
    pub terminated: bool,
}

/// Ends a session with the authentication provider.
pub trait SessionTerminator: Send + Sync + std::fmt::Debug {
    fn sign_out(&self, session: &str);
}

/// Terminator that only records the sign-out in the log.
#[derive(Debug, Default)]
pub struct LoggingTerminator;

impl SessionTerminator for LoggingTerminator {
    fn sign_out(&self, session: &str) {
        info!(session, "forced sign-out requested");
    }
}

#[derive(Debug)]
struct SessionState {
    tracker: ActivityTracker,
    terminated: bool,
}

// == Protection Orchestrator ==
#[derive(Debug)]
pub struct ProtectionOrchestrator {
    api: RateLimiter,
    page: RateLimiter,
    classifier: Box<dyn BotClassifier>,
    terminator: Arc<dyn SessionTerminator>,
    thresholds: ActivityThresholds,
    sessions: HashMap<String, SessionState>,
    clock: SharedClock,
}

impl ProtectionOrchestrator {
    pub fn new(
        api_limit: RateLimitConfig,
        page_limit: RateLimitConfig,
        thresholds: ActivityThresholds,
        classifier: Box<dyn BotClassifier>,
        terminator: Arc<dyn SessionTerminator>,
        clock: SharedClock,
    ) -> Self {
        Self {
            api: RateLimiter::new(api_limit, clock.clone()),
            page: RateLimiter::new(page_limit, clock.clone()),
            classifier,
            terminator,
            thresholds,
            sessions: HashMap::new(),
            clock,
        }
    }

    fn limiter(&self, traffic: TrafficClass) -> &RateLimiter {
        match traffic {
            TrafficClass::Api => &self.api,
            TrafficClass::Page => &self.page,
        }
    }

    fn limiter_mut(&mut self, traffic: TrafficClass) -> &mut RateLimiter {
        match traffic {
            TrafficClass::Api => &mut self.api,
            TrafficClass::Page => &mut self.page,
        }
    }

    // == Rate Limit ==
    /// Counts a request for `identifier` and reports the limiter status.
    pub fn check_rate_limit(&mut self, traffic: TrafficClass, identifier: &str) -> RateLimitStatus {
        self.limiter_mut(traffic).check(identifier)
    }

    /// Limiter status for `identifier` without counting a request.
    pub fn rate_limit_status(&self, traffic: TrafficClass, identifier: &str) -> RateLimitStatus {
        self.limiter(traffic).peek(identifier)
    }

    pub fn is_terminated(&self, session: &str) -> bool {
        self.sessions
            .get(session)
            .map(|state| state.terminated)
            .unwrap_or(false)
    }

    // == Admission ==
    /// Decides whether a request may proceed.
    ///
    /// Terminated sessions are refused outright, bots are refused on protected
    /// routes, and everything else is counted against its traffic class.
    pub fn admit(&mut self, request: &AccessRequest) -> AccessDecision {
        let identifier = request.identifier.as_str();

        if self.is_terminated(identifier) {
            return AccessDecision {
                allowed: false,
                reason: Some(DenyReason::SessionTerminated),
                status: self.rate_limit_status(request.traffic, identifier),
            };
        }

        let signal = self.classifier.classify(&request.meta);
        if signal.is_bot && request.route == RouteKind::Protected {
            warn!(
                identifier,
                category = signal.category.as_deref().unwrap_or("unknown"),
                "bot refused on protected route"
            );
            return AccessDecision {
                allowed: false,
                reason: Some(DenyReason::Bot {
                    category: signal.category,
                }),
                status: self.rate_limit_status(request.traffic, identifier),
            };
        }

        let status = self.check_rate_limit(request.traffic, identifier);
        if !status.is_allowed {
            warn!(identifier, traffic = ?request.traffic, blocked_until = ?status.blocked_until, "rate limit exceeded");
            return AccessDecision {
                allowed: false,
                reason: Some(DenyReason::RateLimited),
                status,
            };
        }

        AccessDecision {
            allowed: true,
            reason: None,
            status,
        }
    }

    /// Admission for a data fetch: counts against the API limiter and the
    /// session's request activity.
    pub fn authorize_api_call(&mut self, identifier: &str) -> Result<RateLimitStatus> {
        if self.is_terminated(identifier) {
            return Err(ShieldError::SessionTerminated(identifier.to_string()));
        }

        let status = self.check_rate_limit(TrafficClass::Api, identifier);
        if !status.is_allowed {
            return Err(ShieldError::RateLimited {
                blocked_until: status.blocked_until,
            });
        }

        if self.track_request(identifier).terminated {
            return Err(ShieldError::SessionTerminated(identifier.to_string()));
        }

        Ok(status)
    }

    // == Activity ==
    /// Records a route change for `session`.
    pub fn record_navigation(&mut self, session: &str, path: &str) -> ActivityReport {
        let now = self.clock.now_ms();
        self.session_mut(session).tracker.record_navigation(path, now);
        self.escalate(session, now)
    }

    /// Records a request for `session`.
    pub fn track_request(&mut self, session: &str) -> ActivityReport {
        let now = self.clock.now_ms();
        self.session_mut(session).tracker.track_request(now);
        self.escalate(session, now)
    }

    /// Current activity state of `session`.
    pub fn activity(&self, session: &str) -> ActivitySnapshot {
        let now = self.clock.now_ms();
        match self.sessions.get(session) {
            Some(state) => state.tracker.snapshot(now),
            None => ActivityTracker::new(self.thresholds).snapshot(now),
        }
    }

    /// Activity state of `session` with the verdict it currently warrants.
    /// Read-only: no escalation is applied.
    pub fn activity_report(&self, session: &str) -> ActivityReport {
        let now = self.clock.now_ms();
        match self.sessions.get(session) {
            Some(state) => ActivityReport {
                snapshot: state.tracker.snapshot(now),
                verdict: state.tracker.verdict(now),
                terminated: state.terminated,
            },
            None => ActivityReport {
                snapshot: self.activity(session),
                verdict: AbuseVerdict::None,
                terminated: false,
            },
        }
    }

    // == Session Sweep ==
    /// Drops sessions whose activity windows have all drained.
    ///
    /// Terminated sessions are kept so the sign-out stays in force. Returns
    /// the number of sessions dropped.
    pub fn prune_idle_sessions(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, state| state.terminated || !state.tracker.is_idle(now));
        before - self.sessions.len()
    }

    /// Number of sessions with tracked state.
    pub fn tracked_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session_mut(&mut self, session: &str) -> &mut SessionState {
        let thresholds = self.thresholds;
        self.sessions
            .entry(session.to_string())
            .or_insert_with(|| SessionState {
                tracker: ActivityTracker::new(thresholds),
                terminated: false,
            })
    }

    fn escalate(&mut self, session: &str, now: u64) -> ActivityReport {
        let terminator = self.terminator.clone();
        let state = self.session_mut(session);
        let snapshot = state.tracker.snapshot(now);
        let verdict = state.tracker.verdict(now);

        match verdict {
            AbuseVerdict::None => {}
            AbuseVerdict::Warn => {
                warn!(
                    session,
                    rapid_navigation = snapshot.rapid_navigation,
                    unusual_pattern = snapshot.unusual_pattern,
                    "suspicious activity detected"
                );
            }
            AbuseVerdict::SignOut => {
                if !state.terminated {
                    state.terminated = true;
                    warn!(
                        session,
                        suspicious_requests = snapshot.suspicious_request_count,
                        rapid_navigation = snapshot.rapid_navigation,
                        "extreme abuse detected, forcing sign-out"
                    );
                    terminator.sign_out(session);
                }
            }
        }

        ActivityReport {
            snapshot,
            verdict,
            terminated: state.terminated,
        }
    }
}
