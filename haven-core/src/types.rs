//! Re-export of foundational types from `haven-types`.
// Consolidated re-exports so downstream crates can depend on `haven-core` only

pub use haven_types::{
    Backoff, Category, Coordinates, HavenConfig, HavenError, LookupKey, LookupRequest,
    LookupResponse, Resource, RetryPolicy, SourceKey, round3,
};
