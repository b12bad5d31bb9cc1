//! Rate Limiter Module
//!
//! Per-identifier request counting with block/cooldown semantics. The limiter
//! is class-agnostic; the application keeps one instance per [`TrafficClass`].

mod entry;
mod window;


use serde::{Deserialize, Serialize};

pub use entry::{RateLimitConfig, RateLimitEntry};
pub use window::{RateLimitStatus, RateLimiter};

// == Traffic Class ==
/// Which limiter a request is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficClass {
    /// General API calls
    Api,
    /// Page navigations
    Page,
}

impl std::str::FromStr for TrafficClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(TrafficClass::Api),
            "page" => Ok(TrafficClass::Page),
            other => Err(format!("Unknown traffic class '{}'", other)),
        }
    }
}
