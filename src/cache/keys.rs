//! Cache key construction and TTL tiers.
//!
//! Keys follow `namespace` or `namespace_<compact json>` so that a single
//! pattern such as `^advisors_page_` can target every cached variant of a
//! listing without knowing which parameter combinations were ever cached.

use serde::{Deserialize, Serialize};

// == TTL Tier ==
/// Which lifetime a kind of data is cached for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// Listings and counts that change often
    Default,
    /// Reference data that rarely changes
    Static,
    /// User profile data
    Profile,
}

/// TTL in milliseconds for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlTiers {
    pub default_ms: u64,
    pub static_ms: u64,
    pub profile_ms: u64,
}

impl TtlTiers {
    pub fn ttl_ms(&self, tier: CacheTier) -> u64 {
        match tier {
            CacheTier::Default => self.default_ms,
            CacheTier::Static => self.static_ms,
            CacheTier::Profile => self.profile_ms,
        }
    }
}

impl Default for TtlTiers {
    fn default() -> Self {
        Self {
            default_ms: 5 * 60 * 1000,
            static_ms: 15 * 60 * 1000,
            profile_ms: 30 * 60 * 1000,
        }
    }
}

// == Key Builder ==
/// Builds a deterministic cache key from a namespace and serializable params.
///
/// Parameters serializing to `null` (e.g. `()` or `None`) yield the bare
/// namespace. Struct fields serialize in declaration order, so the same
/// parameters always produce the same key.
pub fn cache_key<P: Serialize + ?Sized>(namespace: &str, params: &P) -> String {
    match serde_json::to_value(params) {
        Ok(serde_json::Value::Null) | Err(_) => namespace.to_string(),
        Ok(value) => format!("{}_{}", namespace, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct PageParams {
        page: u32,
        sort: &'static str,
    }

    #[test]
    fn test_tier_lookup() {
        let tiers = TtlTiers::default();
        assert!(tiers.ttl_ms(CacheTier::Default) < tiers.ttl_ms(CacheTier::Static));
        assert!(tiers.ttl_ms(CacheTier::Static) < tiers.ttl_ms(CacheTier::Profile));
    }

    #[test]
    fn test_cache_key_without_params() {
        assert_eq!(cache_key("advisor_count", &()), "advisor_count");
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("advisors_page", &PageParams { page: 2, sort: "name" });
        let b = cache_key("advisors_page", &PageParams { page: 2, sort: "name" });
        assert_eq!(a, b);
        assert_eq!(a, r#"advisors_page_{"page":2,"sort":"name"}"#);
    }

    #[test]
    fn test_cache_key_scalar_params() {
        assert_eq!(cache_key("user_reports", &42), "user_reports_42");
        assert_eq!(cache_key("search", &json!(["a", "b"])), r#"search_["a","b"]"#);
    }
}
