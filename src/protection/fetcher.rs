//! Protected data fetching.
//!
//! Every fetch is admitted by the orchestrator, served from the cache when a
//! live entry exists, and otherwise run under the retry policy with the
//! result cached for its tier.

use std::future::Future;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheTier, TtlCache, TtlTiers};
use crate::error::{FetchError, Result};
use crate::protection::ProtectionOrchestrator;
use crate::retry::{with_retry, RetryOptions, RetrySettings};

// == Protected Fetcher ==
#[derive(Debug)]
pub struct ProtectedFetcher<V> {
    orchestrator: Arc<RwLock<ProtectionOrchestrator>>,
    cache: Arc<RwLock<TtlCache<V>>>,
    tiers: TtlTiers,
    retry: RetrySettings,
}

impl<V> Clone for ProtectedFetcher<V> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            cache: self.cache.clone(),
            tiers: self.tiers,
            retry: self.retry,
        }
    }
}

impl<V: Clone> ProtectedFetcher<V> {
    pub fn new(
        orchestrator: Arc<RwLock<ProtectionOrchestrator>>,
        cache: Arc<RwLock<TtlCache<V>>>,
        tiers: TtlTiers,
        retry: RetrySettings,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            tiers,
            retry,
        }
    }

    // == Fetch ==
    /// Returns the value for `key`, fetching it with `operation` on a miss.
    ///
    /// # Errors
    /// - `RateLimited` / `SessionTerminated` when `identifier` is not admitted
    /// - `Upstream` with the last failure once retries are exhausted
    pub async fn fetch<F, Fut>(
        &self,
        identifier: &str,
        key: &str,
        tier: CacheTier,
        operation: F,
    ) -> Result<V>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<V, FetchError>>,
    {
        self.orchestrator
            .write()
            .await
            .authorize_api_call(identifier)?;

        if let Some(value) = self.cache.write().await.get(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        let value = with_retry(operation, RetryOptions::from(self.retry)).await?;

        self.cache
            .write()
            .await
            .set(key, value.clone(), Some(self.tiers.ttl_ms(tier)));

        Ok(value)
    }

    // == Invalidation ==
    /// Drops every cached entry matching one of `patterns`, typically after a
    /// mutation touching that data.
    pub async fn invalidate_patterns(&self, patterns: &[Regex]) -> usize {
        let removed = self.cache.write().await.invalidate_by_patterns(patterns);
        debug!(removed, "cache entries invalidated");
        removed
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.write().await.invalidate(key)
    }
}
