//! API Routes
//!
//! Configures the Axum router with all sidecar endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activity_handler, admission_handler, clear_handler, health_handler, invalidate_handler,
    navigate_handler, rate_limit_handler, stats_handler, track_request_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /admission` - Admission decision for a request (counts against the limiter)
/// - `GET /rate-limit/:traffic/:identifier` - Limiter status, read only
/// - `POST /activity/:session/navigate` - Record a route change
/// - `POST /activity/:session/request` - Record a request
/// - `GET /activity/:session` - Suspicious-activity state
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/invalidate` - Drop keys and key patterns
/// - `DELETE /cache` - Drop everything
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: the dashboard runs on a different origin
/// - Tracing: logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/admission", post(admission_handler))
        .route("/rate-limit/:traffic/:identifier", get(rate_limit_handler))
        .route("/activity/:session", get(activity_handler))
        .route("/activity/:session/navigate", post(navigate_handler))
        .route("/activity/:session/request", post(track_request_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
