//! Request and Response models for the sidecar API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AdmissionRequest, InvalidateRequest, NavigateRequest};
pub use responses::{
    ActivityResponse, AdmissionResponse, ErrorResponse, HealthResponse, InvalidateResponse,
    RateLimitResponse, StatsResponse,
};
