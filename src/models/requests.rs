//! Request DTOs for the sidecar API
//!
//! Defines the structure of incoming HTTP request bodies.

use regex::Regex;
use serde::Deserialize;

use crate::limiter::TrafficClass;
use crate::protection::{AccessRequest, RequestMeta, RouteKind};

/// Longest identifier or session token accepted
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

fn validate_identifier(identifier: &str) -> Option<String> {
    if identifier.is_empty() {
        return Some("Identifier cannot be empty".to_string());
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Some(format!(
            "Identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        ));
    }
    None
}

/// Request body for POST /admission
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionRequest {
    /// Per-session token
    pub identifier: String,
    pub route: RouteKind,
    pub traffic: TrafficClass,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub webdriver: bool,
}

impl AdmissionRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_identifier(&self.identifier)
    }

    pub fn into_access_request(self) -> AccessRequest {
        AccessRequest {
            identifier: self.identifier,
            route: self.route,
            traffic: self.traffic,
            meta: RequestMeta {
                user_agent: self.user_agent,
                webdriver: self.webdriver,
            },
        }
    }
}

/// Request body for POST /activity/:session/navigate
#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    /// Logical route path, e.g. `/advisors`
    pub path: String,
}

impl NavigateRequest {
    pub fn validate(&self) -> Option<String> {
        if !self.path.starts_with('/') {
            return Some("Path must start with '/'".to_string());
        }
        None
    }
}

/// Request body for POST /cache/invalidate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    /// Exact keys to drop
    #[serde(default)]
    pub keys: Vec<String>,
    /// Regular expressions; a key matching any of them is dropped
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl InvalidateRequest {
    /// Compiles `patterns`, reporting the first one that is not a valid regex.
    pub fn compile_patterns(&self) -> Result<Vec<Regex>, String> {
        self.patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| format!("Invalid pattern '{}': {}", p, e)))
            .collect()
    }
}

pub(crate) fn validate_session(session: &str) -> Option<String> {
    validate_identifier(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_request_deserialize() {
        let json = r#"{"identifier":"tok-1","route":"protected","traffic":"page"}"#;
        let req: AdmissionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.identifier, "tok-1");
        assert_eq!(req.route, RouteKind::Protected);
        assert_eq!(req.traffic, TrafficClass::Page);
        assert!(req.user_agent.is_none());
        assert!(!req.webdriver);
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_admission_request_rejects_unknown_route() {
        let json = r#"{"identifier":"tok-1","route":"secret","traffic":"page"}"#;
        assert!(serde_json::from_str::<AdmissionRequest>(json).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier(&"x".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_some());
        assert!(validate_identifier("ok").is_none());
    }

    #[test]
    fn test_navigate_request_validate() {
        let ok = NavigateRequest { path: "/reports".into() };
        let bad = NavigateRequest { path: "reports".into() };
        assert!(ok.validate().is_none());
        assert!(bad.validate().is_some());
    }

    #[test]
    fn test_compile_patterns() {
        let req: InvalidateRequest =
            serde_json::from_str(r#"{"patterns":["^advisors_page_","count$"]}"#).unwrap();
        assert!(req.keys.is_empty());
        assert_eq!(req.compile_patterns().unwrap().len(), 2);

        let bad = InvalidateRequest {
            keys: vec![],
            patterns: vec!["(".into()],
        };
        assert!(bad.compile_patterns().unwrap_err().contains("Invalid pattern"));
    }
}
