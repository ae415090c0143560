//! haven-middleware
//!
//! Cross-cutting wrappers used by the haven orchestrator:
//!
//! - [`TtlCache`]: lazily-expiring, LRU-bounded in-memory cache keyed by lookup.
//! - [`RetryExecutor`]: bounded attempts, per-attempt timeout, backoff with jitter.
//! - [`RetryingSource`]: a [`haven_core::SourceAdapter`] that routes every fetch
//!   through a [`RetryExecutor`].
#![warn(missing_docs)]

mod cache;
mod retry;

pub use crate::cache::TtlCache;
pub use crate::retry::{RetryExecutor, RetryingSource};
