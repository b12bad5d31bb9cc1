//! Suspicious-activity tracking per session.
//!
//! Two trailing windows are kept: route changes (default 10s) and tracked
//! requests (default 60s). Exceeding either count flags the session as
//! suspicious; the abuse verdict escalates to a forced sign-out. Requests
//! made while flagged are kept in their own trailing window, so the sign-out
//! count decays like the others.

use std::collections::VecDeque;

use serde::Serialize;

// == Thresholds ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityThresholds {
    /// Route changes tolerated within the navigation window
    pub navigation_max: usize,
    pub navigation_window_ms: u64,
    /// Requests tolerated within the request window
    pub request_max: usize,
    pub request_window_ms: u64,
    /// Requests tracked while suspicious, within one request window, before
    /// the session is signed out
    pub sign_out_request_count: u64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            navigation_max: 5,
            navigation_window_ms: 10_000,
            request_max: 20,
            request_window_ms: 60_000,
            sign_out_request_count: 50,
        }
    }
}

// == Snapshot ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivitySnapshot {
    pub rapid_navigation: bool,
    pub unusual_pattern: bool,
    pub is_suspicious: bool,
    /// Route changes inside the trailing navigation window
    pub navigation_count: usize,
    /// Requests inside the trailing request window
    pub request_count: usize,
    /// Requests made while flagged, inside the trailing request window
    pub suspicious_request_count: u64,
}

// == Verdict ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbuseVerdict {
    None,
    /// Suspicious, worth a warning
    Warn,
    /// Terminate the session
    SignOut,
}

// == Activity Tracker ==
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    thresholds: ActivityThresholds,
    navigations: VecDeque<u64>,
    requests: VecDeque<u64>,
    /// Timestamps of requests that arrived while the session was flagged
    suspicious_requests: VecDeque<u64>,
    current_path: Option<String>,
}

impl ActivityTracker {
    pub fn new(thresholds: ActivityThresholds) -> Self {
        Self {
            thresholds,
            navigations: VecDeque::new(),
            requests: VecDeque::new(),
            suspicious_requests: VecDeque::new(),
            current_path: None,
        }
    }

    /// Records a navigation to `path` at `now`.
    ///
    /// Navigating to the path the session is already on is not a route change
    /// and is ignored. Returns whether the event was counted.
    pub fn record_navigation(&mut self, path: &str, now: u64) -> bool {
        if self.current_path.as_deref() == Some(path) {
            return false;
        }
        self.current_path = Some(path.to_string());
        self.navigations.push_back(now);
        self.prune(now);
        true
    }

    /// Records one request at `now`.
    pub fn track_request(&mut self, now: u64) {
        self.requests.push_back(now);
        self.prune(now);
        if self.snapshot(now).is_suspicious {
            self.suspicious_requests.push_back(now);
        }
    }

    /// Evaluates both windows as they stand at `now`.
    pub fn snapshot(&self, now: u64) -> ActivitySnapshot {
        let navigation_count =
            count_within(&self.navigations, now, self.thresholds.navigation_window_ms);
        let request_count = count_within(&self.requests, now, self.thresholds.request_window_ms);
        let suspicious_request_count = count_within(
            &self.suspicious_requests,
            now,
            self.thresholds.request_window_ms,
        ) as u64;

        let rapid_navigation = navigation_count > self.thresholds.navigation_max;
        let unusual_pattern = request_count > self.thresholds.request_max;

        ActivitySnapshot {
            rapid_navigation,
            unusual_pattern,
            is_suspicious: rapid_navigation || unusual_pattern,
            navigation_count,
            request_count,
            suspicious_request_count,
        }
    }

    /// Escalation decision for the state at `now`.
    pub fn verdict(&self, now: u64) -> AbuseVerdict {
        let snapshot = self.snapshot(now);

        let extreme = snapshot.suspicious_request_count > self.thresholds.sign_out_request_count
            || (snapshot.rapid_navigation && snapshot.is_suspicious);

        if extreme {
            AbuseVerdict::SignOut
        } else if snapshot.is_suspicious {
            AbuseVerdict::Warn
        } else {
            AbuseVerdict::None
        }
    }

    fn prune(&mut self, now: u64) {
        prune_older(&mut self.navigations, now, self.thresholds.navigation_window_ms);
        prune_older(&mut self.requests, now, self.thresholds.request_window_ms);
        prune_older(
            &mut self.suspicious_requests,
            now,
            self.thresholds.request_window_ms,
        );
    }

    /// Whether every window has drained by `now`, leaving nothing that could
    /// influence a verdict.
    pub fn is_idle(&self, now: u64) -> bool {
        let thresholds = &self.thresholds;
        count_within(&self.navigations, now, thresholds.navigation_window_ms) == 0
            && count_within(&self.requests, now, thresholds.request_window_ms) == 0
            && count_within(&self.suspicious_requests, now, thresholds.request_window_ms) == 0
    }
}

fn count_within(events: &VecDeque<u64>, now: u64, window_ms: u64) -> usize {
    events
        .iter()
        .filter(|&&at| now.saturating_sub(at) <= window_ms)
        .count()
}

fn prune_older(events: &mut VecDeque<u64>, now: u64, window_ms: u64) {
    while let Some(&oldest) = events.front() {
        if now.saturating_sub(oldest) > window_ms {
            events.pop_front();
        } else {
            break;
        }
    }
}
