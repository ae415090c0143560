//! Configuration types shared across the orchestrator and its resilience layers.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay schedule applied between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Backoff {
    /// Sleep the same duration after every retryable failure.
    Fixed(Duration),
    /// Sleep `2^(attempt + 1) * base`, where `attempt` is the zero-based index
    /// of the attempt that just failed.
    Exponential {
        /// Multiplier for the power-of-two schedule.
        base: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the zero-based `attempt` failed, before jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential { base } => {
                let factor = 2u32.saturating_pow(attempt.saturating_add(1));
                base.saturating_mul(factor)
            }
        }
    }
}

/// Bounded-attempt retry policy for a single source call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Timeout applied to each attempt individually.
    pub timeout: Duration,
    /// Delay schedule between attempts.
    pub backoff: Backoff,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl RetryPolicy {
    /// Policy used for resource lookups: 2 attempts, 8s timeout, fixed 2s backoff.
    #[must_use]
    pub const fn resource_lookup() -> Self {
        Self {
            max_attempts: 2,
            timeout: Duration::from_secs(8),
            backoff: Backoff::Fixed(Duration::from_secs(2)),
            jitter_percent: 0,
        }
    }

    /// Policy for higher-stakes upstream requests: 3 attempts, 10s timeout,
    /// exponential backoff on a 1s base (2s, 4s, ...).
    #[must_use]
    pub const fn upstream_request() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(10),
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
            },
            jitter_percent: 0,
        }
    }

    /// Attempts actually performed, never less than one.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::resource_lookup()
    }
}

/// Global configuration for the `Haven` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HavenConfig {
    /// How long a merged result stays servable from the cache.
    pub cache_ttl: Duration,
    /// Most merged results held at once; the least recently used is evicted first.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Search radius used when the caller does not override it.
    pub default_radius_meters: f64,
    /// Retry policy applied to sources without an explicit override.
    pub retry: RetryPolicy,
    /// Per-source retry overrides, keyed by source name.
    pub per_source_retry: HashMap<String, RetryPolicy>,
}

const fn default_cache_capacity() -> usize {
    1024
}

impl HavenConfig {
    /// Policy in effect for the named source.
    #[must_use]
    pub fn retry_for(&self, source: &str) -> RetryPolicy {
        self.per_source_retry
            .get(source)
            .copied()
            .unwrap_or(self.retry)
    }
}

impl Default for HavenConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            cache_capacity: default_cache_capacity(),
            default_radius_meters: 5000.0,
            retry: RetryPolicy::default(),
            per_source_retry: HashMap::new(),
        }
    }
}
