use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the haven workspace.
///
/// Each variant is classified as retryable (transient network-level faults) or
/// terminal (contract mismatches, rejected requests, bad input). The retry
/// executor and the orchestrator only ever consult [`HavenError::is_retryable`].
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum HavenError {
    /// The backend answered with a body that does not match its expected shape.
    #[error("{provider} returned a malformed response: {msg}")]
    Validation {
        /// Source name that produced the response.
        provider: String,
        /// Description of the mismatch.
        msg: String,
    },

    /// The backend reported that the requested resource does not exist.
    #[error("{provider} has no {what}")]
    NotFound {
        /// Source name.
        provider: String,
        /// Description of what was missing.
        what: String,
    },

    /// The backend refused the credentials or the caller is not allowed.
    #[error("{provider} rejected the request as unauthorized (HTTP {status})")]
    Unauthorized {
        /// Source name.
        provider: String,
        /// HTTP status code (401 or 403).
        status: u16,
    },

    /// The backend answered successfully at the transport level but reported a failure.
    #[error("{provider} rejected the request: {msg}")]
    Rejected {
        /// Source name.
        provider: String,
        /// Message reported by the backend.
        msg: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Transport-level failure (connection refused, reset, DNS, ...).
    #[error("{provider} network failure: {msg}")]
    Network {
        /// Source name.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A single call exceeded its configured timeout.
    #[error("{provider} timed out after {timeout_ms}ms")]
    Timeout {
        /// Source name.
        provider: String,
        /// Timeout applied to the call, in milliseconds.
        timeout_ms: u64,
    },

    /// The backend answered with an unexpected non-2xx status.
    #[error("{provider} returned HTTP {status}")]
    Status {
        /// Source name.
        provider: String,
        /// HTTP status code.
        status: u16,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("{provider} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        /// Source name.
        provider: String,
        /// Number of attempts performed.
        attempts: u32,
        /// The last observed failure.
        last: Box<HavenError>,
    },

    /// Every source failed for a single lookup.
    #[error("all sources failed (retryable={retryable}): {errors:?}")]
    AllSourcesFailed {
        /// Logical OR of the constituent failures' retryable flags.
        retryable: bool,
        /// The individual failures, in source priority order.
        errors: Vec<HavenError>,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl HavenError {
    /// Helper: build a `Validation` error.
    pub fn validation(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Network` error.
    pub fn network(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Timeout` error.
    pub fn timeout(provider: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Helper: build a `NotFound` error.
    pub fn not_found(provider: impl Into<String>, what: impl Into<String>) -> Self {
        Self::NotFound {
            provider: provider.into(),
            what: what.into(),
        }
    }

    /// Helper: build a `Rejected` error.
    pub fn rejected(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Rejected {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Collapse a set of per-source failures into `AllSourcesFailed`.
    ///
    /// The aggregate is retryable when at least one constituent is.
    #[must_use]
    pub fn all_sources_failed(errors: Vec<Self>) -> Self {
        let retryable = errors.iter().any(Self::is_retryable);
        Self::AllSourcesFailed { retryable, errors }
    }

    /// Returns true if the failure is transient and worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Status { .. } => true,
            Self::RetriesExhausted { last, .. } => last.is_retryable(),
            Self::AllSourcesFailed { retryable, .. } => *retryable,
            Self::Validation { .. }
            | Self::NotFound { .. }
            | Self::Unauthorized { .. }
            | Self::Rejected { .. }
            | Self::InvalidArg(_)
            | Self::Other(_) => false,
        }
    }

    /// Message suitable for the end user of a lookup.
    ///
    /// Partial failures never reach the user, so this is only meaningful for
    /// total failures and invalid input.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidArg(msg) => msg.clone(),
            e if e.is_retryable() => "No nearby resources found. Please try again.".to_string(),
            _ => "Resource lookup is unavailable right now.".to_string(),
        }
    }

    /// Flatten nested aggregates and retry wrappers into their leaf failures.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllSourcesFailed { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            Self::RetriesExhausted { last, .. } => last.flatten(),
            other => vec![other],
        }
    }
}
