//! Bounded-attempt retry with per-attempt timeout, and a source wrapper built on it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use haven_core::{HavenError, Resource, RetryPolicy, SourceAdapter, SourceQuery};
use rand::Rng;

/// Add up to `jitter_percent` percent of `base` as uniform random jitter.
fn jitter_wait(base: Duration, jitter_percent: u8) -> Duration {
    if jitter_percent == 0 {
        return base;
    }
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let range = std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent.min(100))) / 100);
    let mut rng = rand::rng();
    base + Duration::from_millis(rng.random_range(0..range))
}

/// Runs a fallible async call under a [`RetryPolicy`].
///
/// - every attempt is bounded by `policy.timeout`; the in-flight future is
///   dropped when it elapses, which cancels the underlying request
/// - retryable failures sleep the backoff and try again while attempts remain
/// - non-retryable failures are returned immediately, unchanged
/// - exhausting the attempts yields [`HavenError::RetriesExhausted`], whose
///   retryable flag is the last failure's
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create an executor for the given policy.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy this executor applies.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Delay before the attempt following the zero-based `failed_attempt`.
    #[must_use]
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        jitter_wait(
            self.policy.backoff.delay_for(failed_attempt),
            self.policy.jitter_percent,
        )
    }

    /// Execute `call` until it succeeds, fails terminally, or runs out of attempts.
    ///
    /// `provider` labels timeout and exhaustion errors.
    ///
    /// # Errors
    /// Returns the first non-retryable error, or `RetriesExhausted` wrapping the
    /// last retryable one.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "haven::retry::execute",
            skip(self, call),
            fields(
                max_attempts = self.policy.attempts(),
                timeout_ms = u64::try_from(self.policy.timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub async fn execute<T, F, Fut>(&self, provider: &str, mut call: F) -> Result<T, HavenError>
    where
        F: FnMut() -> Fut,
        Fut: core::future::Future<Output = Result<T, HavenError>>,
    {
        let max_attempts = self.policy.attempts();
        let mut attempt: u32 = 0;
        loop {
            let outcome = (tokio::time::timeout(self.policy.timeout, call()).await)
                .unwrap_or_else(|_| Err(HavenError::timeout(provider, self.policy.timeout)));

            let err = match outcome {
                Ok(v) => return Ok(v),
                Err(e) if !e.is_retryable() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt = attempt + 1, error = %e, "non-retryable failure");
                    return Err(e);
                }
                Err(e) => e,
            };

            attempt += 1;
            if attempt >= max_attempts {
                return Err(HavenError::RetriesExhausted {
                    provider: provider.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.delay_after(attempt - 1);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retryable failure; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Source wrapper that runs every `fetch` of its inner source through a [`RetryExecutor`].
pub struct RetryingSource {
    inner: Arc<dyn SourceAdapter>,
    executor: RetryExecutor,
}

impl RetryingSource {
    /// Wrap `inner` with the given policy.
    #[must_use]
    pub fn new(inner: Arc<dyn SourceAdapter>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            executor: RetryExecutor::new(policy),
        }
    }

    /// Access the wrapped source.
    #[must_use]
    pub const fn inner(&self) -> &Arc<dyn SourceAdapter> {
        &self.inner
    }

    /// The policy applied to each fetch.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }
}

#[async_trait]
impl SourceAdapter for RetryingSource {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError> {
        let inner = &self.inner;
        self.executor
            .execute(inner.name(), || inner.fetch(query))
            .await
    }
}
