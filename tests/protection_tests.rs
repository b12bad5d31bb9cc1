//! Integration Tests for the protected fetch path
//!
//! Drives the limiter -> cache -> retry flow through `AppState::fetcher` with
//! a manual clock and a scripted data store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use regex::Regex;
use serde_json::{json, Value};

use dash_shield::cache::{cache_key, CacheTier};
use dash_shield::clock::ManualClock;
use dash_shield::error::{FetchError, ShieldError};
use dash_shield::limiter::RateLimitConfig;
use dash_shield::protection::SessionTerminator;
use dash_shield::retry::RetrySettings;
use dash_shield::{AppState, Config};

// == Helpers ==

#[derive(Debug, Default)]
struct RecordingTerminator {
    sessions: Mutex<Vec<String>>,
}

impl SessionTerminator for RecordingTerminator {
    fn sign_out(&self, session: &str) {
        self.sessions.lock().unwrap().push(session.to_string());
    }
}

fn test_config() -> Config {
    Config {
        api_limit: RateLimitConfig {
            max_requests: 100,
            window_ms: 60_000,
            block_duration_ms: 300_000,
        },
        retry: RetrySettings {
            max_attempts: 3,
            delay_ms: 10,
            backoff: true,
        },
        ..Config::default()
    }
}

fn setup(config: Config) -> (AppState, Arc<ManualClock>, Arc<RecordingTerminator>) {
    let clock = ManualClock::new(1_700_000_000_000);
    let terminator = Arc::new(RecordingTerminator::default());
    let state = AppState::with_parts(&config, clock.clone(), terminator.clone());
    (state, clock, terminator)
}

fn page_key(page: u32) -> String {
    cache_key("advisors_page", &json!({ "page": page, "sort": "name" }))
}

// == Caching ==

#[tokio::test(start_paused = true)]
async fn test_second_fetch_served_from_cache() {
    let (state, _, _) = setup(test_config());
    let fetcher = state.fetcher();
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
        let value = fetcher
            .fetch("s1", &page_key(1), CacheTier::Default, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<Value, FetchError>(json!([{"name": "Ada"}])) }
            })
            .await
            .unwrap();
        assert_eq!(value[0]["name"], "Ada");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = state.cache.read().await.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let config = test_config();
    let profile_ttl = config.ttl_tiers.profile_ms;
    let (state, clock, _) = setup(config);
    let fetcher = state.fetcher();
    let calls = AtomicU32::new(0);

    let fetch = || async {
        fetcher
            .fetch("s1", "profile_7", CacheTier::Profile, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<Value, FetchError>(json!({"id": 7})) }
            })
            .await
            .unwrap()
    };

    fetch().await;
    clock.advance(profile_ttl);
    fetch().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1, "Still live at exactly the TTL");

    clock.advance(1);
    fetch().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pattern_invalidation_after_mutation() {
    let (state, _, _) = setup(test_config());
    let fetcher = state.fetcher();
    let calls = AtomicU32::new(0);

    for key in [page_key(1), page_key(2), "advisor_count".to_string()] {
        fetcher
            .fetch("s1", &key, CacheTier::Default, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<Value, FetchError>(json!(1)) }
            })
            .await
            .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let removed = fetcher
        .invalidate_patterns(&[Regex::new("^advisors_page_").unwrap()])
        .await;
    assert_eq!(removed, 2);
    assert_eq!(state.cache.read().await.size(), 1);
    assert!(fetcher.invalidate("advisor_count").await);
}

// == Retry ==

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let (state, _, _) = setup(test_config());
    let calls = AtomicU32::new(0);

    let value = state
        .fetcher()
        .fetch("s1", "reports_all", CacheTier::Static, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(FetchError::with_status(503, "upstream unavailable"))
                } else {
                    Ok(json!({"reports": []}))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, json!({"reports": []}));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auth_failure_not_retried_or_cached() {
    let (state, _, _) = setup(test_config());
    let fetcher = state.fetcher();
    let calls = AtomicU32::new(0);

    let result = fetcher
        .fetch("s1", "favorites_s1", CacheTier::Default, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Value, _>(FetchError::with_status(401, "JWT expired")) }
        })
        .await;

    match result {
        Err(ShieldError::Upstream(err)) => assert_eq!(err.status, Some(401)),
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.cache.read().await.size(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_error() {
    let (state, _, _) = setup(test_config());
    let calls = AtomicU32::new(0);

    let result = state
        .fetcher()
        .fetch("s1", "advisor_count", CacheTier::Default, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<Value, _>(FetchError::new(format!("timeout #{}", n))) }
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Upstream failure: timeout #3");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// == Admission ==

#[tokio::test(start_paused = true)]
async fn test_rate_limit_rejects_even_cached_reads() {
    let config = Config {
        api_limit: RateLimitConfig {
            max_requests: 2,
            window_ms: 1_000,
            block_duration_ms: 2_000,
        },
        ..test_config()
    };
    let (state, clock, _) = setup(config);
    let fetcher = state.fetcher();

    let fetch = || {
        fetcher.fetch("s1", "advisor_count", CacheTier::Default, || async {
            Ok::<Value, FetchError>(json!(12))
        })
    };

    assert!(fetch().await.is_ok());
    assert!(fetch().await.is_ok());
    assert!(matches!(
        fetch().await,
        Err(ShieldError::RateLimited { blocked_until: Some(_) })
    ));

    // Another session is unaffected
    let other = fetcher
        .fetch("s2", "advisor_count", CacheTier::Default, || async {
            Ok::<Value, FetchError>(json!(0))
        })
        .await
        .unwrap();
    assert_eq!(other, json!(12));

    clock.advance(2_001);
    assert!(fetch().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_sustained_abuse_terminates_session() {
    let (state, _, terminator) = setup(test_config());
    let fetcher = state.fetcher();

    let mut outcome = Ok(Value::Null);
    for _ in 0..80 {
        outcome = fetcher
            .fetch("s1", "advisor_count", CacheTier::Default, || async {
                Ok::<Value, FetchError>(json!(1))
            })
            .await;
        if outcome.is_err() {
            break;
        }
    }

    assert!(matches!(outcome, Err(ShieldError::SessionTerminated(_))));
    assert_eq!(*terminator.sessions.lock().unwrap(), vec!["s1".to_string()]);
    assert!(state.orchestrator.read().await.is_terminated("s1"));
}
