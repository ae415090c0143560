//! haven-core
//!
//! Core contracts and pure algorithms shared across the haven workspace.
//!
//! - `source`: the `SourceAdapter` trait every backend implements, plus the
//!   shared post-processing step adapters apply to their mapped records.
//! - `geo`: Haversine great-circle distance.
//! - `merge`: cross-source identity and the de-duplicating, distance-sorted merge.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Adapters are `async_trait` objects and are driven by the Tokio runtime in
//! the `haven` orchestrator; nothing in this crate spawns tasks.
#![warn(missing_docs)]

/// Haversine distance.
pub mod geo;
/// Cross-source de-duplication and ordering.
pub mod merge;
/// Source adapter contract.
pub mod source;
pub mod types;

pub use geo::distance;
pub use merge::{identity_key, merge, merge_all, sort_by_distance};
pub use source::{SourceAdapter, SourceQuery, finalize};
pub use types::*;
