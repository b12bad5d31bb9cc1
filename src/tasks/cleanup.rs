//! Sweep Tasks
//!
//! Background tasks that periodically purge expired cache entries and drop
//! idle session trackers so memory does not hold state nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::protection::ProtectionOrchestrator;

/// Spawns a background task that purges expired entries every
/// `cleanup_interval_secs` seconds.
///
/// Returns the task handle so shutdown can abort it.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.cache.clone(), 30);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    cache: Arc<RwLock<TtlCache<V>>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.purge_expired()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

/// Spawns a background task that drops idle, non-terminated sessions every
/// `cleanup_interval_secs` seconds.
pub fn spawn_session_sweep_task(
    orchestrator: Arc<RwLock<ProtectionOrchestrator>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting session sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = orchestrator.write().await.prune_idle_sessions();

            if removed > 0 {
                info!("Session sweep: dropped {} idle sessions", removed);
            } else {
                debug!("Session sweep: no idle sessions found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::limiter::RateLimitConfig;
    use crate::protection::{ActivityThresholds, LoggingTerminator, UserAgentClassifier};

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_entries() {
        let clock = ManualClock::new(0);
        let cache = Arc::new(RwLock::new(TtlCache::new(clock.clone(), 1_000)));
        {
            let mut guard = cache.write().await;
            guard.set("expire_soon", "v".to_string(), Some(10));
            guard.set("long_lived", "v".to_string(), Some(3_600_000));
        }

        clock.advance(11);
        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        {
            let mut guard = cache.write().await;
            assert_eq!(guard.purge_expired(), 0, "Sweep already dropped the entry");
            assert_eq!(guard.size(), 1);
            assert_eq!(guard.stats().misses, 0, "Sweep must not count as reads");
        }

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_sweep_drops_idle_sessions() {
        let clock = ManualClock::new(0);
        let orchestrator = Arc::new(RwLock::new(ProtectionOrchestrator::new(
            RateLimitConfig::api(),
            RateLimitConfig::page(),
            ActivityThresholds::default(),
            Box::new(UserAgentClassifier::new()),
            Arc::new(LoggingTerminator),
            clock.clone(),
        )));
        orchestrator.write().await.track_request("s1");

        clock.advance(60_001);
        let handle = spawn_session_sweep_task(orchestrator.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert_eq!(orchestrator.read().await.tracked_sessions(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache: Arc<RwLock<TtlCache<String>>> =
            Arc::new(RwLock::new(TtlCache::new(ManualClock::new(0), 1_000)));

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
