//! API Handlers
//!
//! HTTP request handlers for each sidecar endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{TtlCache, TtlTiers};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;
use crate::error::{Result, ShieldError};
use crate::limiter::TrafficClass;
use crate::models::requests::validate_session;
use crate::models::{
    ActivityResponse, AdmissionRequest, AdmissionResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, NavigateRequest, RateLimitResponse, StatsResponse,
};
use crate::protection::{
    LoggingTerminator, ProtectedFetcher, ProtectionOrchestrator, SessionTerminator,
    UserAgentClassifier,
};
use crate::retry::RetrySettings;

/// Application state shared across all handlers.
///
/// One cache and one orchestrator per process, shared by every caller so that
/// invalidation and blocking are visible everywhere.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<TtlCache<Value>>>,
    pub orchestrator: Arc<RwLock<ProtectionOrchestrator>>,
    pub tiers: TtlTiers,
    pub retry: RetrySettings,
}

impl AppState {
    /// Creates the state from configuration using the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_parts(config, SystemClock::shared(), Arc::new(LoggingTerminator))
    }

    /// Creates the state with an explicit clock and sign-out hook.
    pub fn with_parts(
        config: &Config,
        clock: SharedClock,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Self {
        let cache = TtlCache::new(clock.clone(), config.ttl_tiers.default_ms);
        let orchestrator = ProtectionOrchestrator::new(
            config.api_limit,
            config.page_limit,
            config.activity,
            Box::new(UserAgentClassifier::new()),
            terminator,
            clock,
        );

        Self {
            cache: Arc::new(RwLock::new(cache)),
            orchestrator: Arc::new(RwLock::new(orchestrator)),
            tiers: config.ttl_tiers,
            retry: config.retry,
        }
    }

    /// Fetch path sharing this state's cache and orchestrator.
    pub fn fetcher(&self) -> ProtectedFetcher<Value> {
        ProtectedFetcher::new(
            self.orchestrator.clone(),
            self.cache.clone(),
            self.tiers,
            self.retry,
        )
    }
}

fn check_session(session: &str) -> Result<()> {
    match validate_session(session) {
        Some(msg) => Err(ShieldError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for POST /admission
///
/// Counts the request against its traffic class and returns the decision.
pub async fn admission_handler(
    State(state): State<AppState>,
    Json(req): Json<AdmissionRequest>,
) -> Result<Json<AdmissionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ShieldError::InvalidRequest(error_msg));
    }

    let request = req.into_access_request();
    let decision = state.orchestrator.write().await.admit(&request);

    Ok(Json(AdmissionResponse::from(decision)))
}

/// Handler for GET /rate-limit/:traffic/:identifier
///
/// Reports limiter status without counting a request.
pub async fn rate_limit_handler(
    State(state): State<AppState>,
    Path((traffic, identifier)): Path<(String, String)>,
) -> Result<Json<RateLimitResponse>> {
    let traffic: TrafficClass = traffic.parse().map_err(ShieldError::InvalidRequest)?;
    check_session(&identifier)?;

    let status = state
        .orchestrator
        .read()
        .await
        .rate_limit_status(traffic, &identifier);

    Ok(Json(RateLimitResponse::new(identifier, traffic, status)))
}

/// Handler for POST /activity/:session/navigate
pub async fn navigate_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<ActivityResponse>> {
    check_session(&session)?;
    if let Some(error_msg) = req.validate() {
        return Err(ShieldError::InvalidRequest(error_msg));
    }

    let report = state
        .orchestrator
        .write()
        .await
        .record_navigation(&session, &req.path);

    Ok(Json(ActivityResponse::from_report(session, report)))
}

/// Handler for POST /activity/:session/request
pub async fn track_request_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<ActivityResponse>> {
    check_session(&session)?;

    let report = state.orchestrator.write().await.track_request(&session);

    Ok(Json(ActivityResponse::from_report(session, report)))
}

/// Handler for GET /activity/:session
pub async fn activity_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<ActivityResponse>> {
    check_session(&session)?;

    let report = state.orchestrator.read().await.activity_report(&session);

    Ok(Json(ActivityResponse::from_report(session, report)))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for POST /cache/invalidate
///
/// Drops the listed keys and every key matching one of the patterns.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let patterns = req.compile_patterns().map_err(ShieldError::InvalidRequest)?;

    let mut cache = state.cache.write().await;
    let by_key = req.keys.iter().filter(|key| cache.invalidate(key)).count();
    let by_pattern = cache.invalidate_by_patterns(&patterns);

    Ok(Json(InvalidateResponse {
        removed: by_key + by_pattern,
    }))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.clear();

    Json(InvalidateResponse { removed })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
