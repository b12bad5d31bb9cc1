//! Retry Module
//!
//! Bounded retry with exponential backoff for fallible async operations.
//! Only the attempt count is bounded; timeouts and cancellation belong to the
//! wrapped operation.

mod classify;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

pub use classify::{ErrorClass, Retryable};

/// Observer invoked with the attempt number and error before each retry sleep.
pub type RetryObserver<E> = Box<dyn Fn(u32, &E) + Send + Sync>;

// == Retry Settings ==
/// Plain retry knobs, as loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Base delay in milliseconds
    pub delay_ms: u64,
    pub backoff: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1_000,
            backoff: true,
        }
    }
}

// == Retry Options ==
/// Options for a single [`with_retry`] call.
pub struct RetryOptions<E> {
    /// Upper bound on invocations of the operation; zero is treated as one
    pub max_attempts: u32,
    /// Base delay between attempts
    pub delay: Duration,
    /// Double the delay after each failed attempt
    pub backoff: bool,
    pub on_retry: Option<RetryObserver<E>>,
}

impl<E> RetryOptions<E> {
    pub fn new() -> Self {
        Self::from(RetrySettings::default())
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn backoff(mut self, backoff: bool) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn on_retry(mut self, observer: impl Fn(u32, &E) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Box::new(observer));
        self
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<RetrySettings> for RetryOptions<E> {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay: Duration::from_millis(settings.delay_ms),
            backoff: settings.backoff,
            on_retry: None,
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("backoff", &self.backoff)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

// == Backoff ==
/// Sleep taken after failed attempt number `attempt` (1-based).
///
/// `delay * 2^(attempt - 1)` with backoff, otherwise a flat `delay`.
pub fn backoff_delay(attempt: u32, delay: Duration, backoff: bool) -> Duration {
    if !backoff {
        return delay;
    }
    let exponent = attempt.saturating_sub(1).min(31);
    delay.saturating_mul(1u32 << exponent)
}

// == With Retry ==
/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` invocations have failed.
///
/// The last failure is returned unchanged; nothing is swallowed.
pub async fn with_retry<T, E, F, Fut>(mut operation: F, options: RetryOptions<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + fmt::Display,
{
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            debug!(attempt, error = %err, "non-retryable failure, giving up");
            return Err(err);
        }

        if attempt >= max_attempts {
            warn!(attempt, error = %err, "retry attempts exhausted");
            return Err(err);
        }

        if let Some(observer) = &options.on_retry {
            observer(attempt, &err);
        }

        let delay = backoff_delay(attempt, options.delay, options.backoff);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "operation failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
