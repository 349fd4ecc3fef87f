//! # Exponential Backoff Retry
//!
//! Retries an operation on transient API failures (HTTP 429, 500, 502, 503),
//! sleeping between attempts with a delay that doubles each time.
//! Non-transient failures are returned unchanged after a single attempt.
//!
//! Sequence with the default 60s initial delay: 60s, 120s, 240s, 480s.
//!
//! ## Usage
//!
//! ```rust
//! use project_cleaner::cleanup::retry::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::new(Duration::from_secs(60));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(60));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(120));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(240));
//! ```

use crate::observability::metrics;
use crate::provider::{ProviderError, ProviderResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Doubling backoff calculator
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay returned by the next call
    current: Duration,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(initial: Duration) -> Self {
        Self { current: initial }
    }

    /// Get the next delay and double the one after it
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = self.current.checked_mul(2).unwrap_or(Duration::MAX);
        result
    }
}

/// Attempt budget and first delay for [`retry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of invocations, first one included
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently or the budget is spent
///
/// At most `policy.max_attempts` invocations happen (at least one). When the
/// budget runs out on a transient failure the last error is wrapped in
/// [`ProviderError::RetriesExhausted`].
///
/// # Errors
/// Returns the first non-transient error unchanged, or `RetriesExhausted`.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = ExponentialBackoff::new(policy.initial_delay);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_transient() {
            return Err(error);
        }
        if attempt >= max_attempts {
            return Err(ProviderError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(error),
            });
        }

        let delay = backoff.next_backoff();
        warn!(
            attempt,
            max_attempts,
            delay_secs = delay.as_secs_f64(),
            error = %error,
            "Transient failure, retrying after backoff"
        );
        metrics::increment_retries();
        tokio::time::sleep(delay).await;
    }
}
