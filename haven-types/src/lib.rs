//! Haven-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod request;
mod resource;
mod source;

pub use config::{Backoff, HavenConfig, RetryPolicy};
pub use error::HavenError;
pub use request::{LookupRequest, LookupResponse};
pub use resource::{Category, Coordinates, LookupKey, Resource, round3};
pub use source::SourceKey;
