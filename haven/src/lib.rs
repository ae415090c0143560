//! Haven finds nearby assistance resources across several directory backends.
//!
//! Overview
//! - Fans a `(latitude, longitude, category)` query out to every registered
//!   [`SourceAdapter`](haven_core::SourceAdapter) concurrently.
//! - Wraps each source call in a retry executor with a per-attempt timeout.
//! - Tolerates partial failure: a lookup fails only when every source fails,
//!   and the aggregate error is retryable if any constituent was.
//! - Merges results in registration order, dropping duplicates by name and
//!   rounded coordinates, and sorts nearest first.
//! - Caches merged results for a TTL keyed by coordinates rounded to three
//!   decimal degrees plus category.
//!
//! Key behaviors and trade-offs
//! - Cache expiry is lazy; an expired entry is evicted by the next read for it.
//!   The cache is capacity-bounded and drops the least recently used entry when full.
//! - Distances are re-measured from the caller's point on every cache hit.
//! - Empty successful results are cached like any other; failures never are.
//! - Overlapping misses for the same key both fetch; the last write wins.
//! - `lookup_within` bypasses the cache because the key ignores the radius.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use haven::{Category, Haven};
//! use haven_sources::{DirectorySource, FinderSource};
//!
//! let haven = Haven::builder()
//!     .with_source(Arc::new(DirectorySource::from_env()?))
//!     .with_source(Arc::new(FinderSource::from_env()?))
//!     .build()?;
//!
//! let shelters = haven.lookup(32.7157, -117.1611, Category::Shelter).await?;
//! ```
#![warn(missing_docs)]

mod core;
mod lookup;

pub use crate::core::{Haven, HavenBuilder};
pub use haven_core::{
    Backoff, Category, Coordinates, HavenConfig, HavenError, LookupRequest, LookupResponse,
    Resource, RetryPolicy, SourceAdapter, SourceKey,
};
