//! haven-mock
//!
//! Test doubles for the haven workspace:
//!
//! - [`MockSource`]: a scripted source whose behavior is driven by a
//!   [`MockController`], with call counting for cache and retry assertions.
//! - [`FixtureSource`]: a deterministic source backed by a small static set of
//!   San Diego resources, for CI-safe examples.
use std::collections::BTreeMap;

use async_trait::async_trait;
use haven_core::{Category, HavenError, Resource, SourceAdapter, SourceQuery, finalize};

mod dynamic;
mod fixtures;

pub use dynamic::{MockBehavior, MockController, MockSource};

/// Build a resource with empty metadata, for scripting mock responses.
#[must_use]
pub fn resource(
    name: &str,
    category: Category,
    latitude: f64,
    longitude: f64,
    distance_meters: f64,
) -> Resource {
    Resource {
        name: name.to_string(),
        category,
        latitude,
        longitude,
        address: String::new(),
        distance_meters,
        metadata: BTreeMap::new(),
    }
}

/// Deterministic source serving static fixture data.
///
/// Distances are computed from the query origin and the usual radius and
/// category filtering applies.
pub struct FixtureSource {
    name: &'static str,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSource {
    /// Create a fixture source named `"haven-fixtures"`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: "haven-fixtures",
        }
    }

    /// Create a fixture source with a custom name.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl SourceAdapter for FixtureSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError> {
        let resources = fixtures::SAN_DIEGO
            .iter()
            .map(|p| {
                let mut metadata = BTreeMap::new();
                if let Some(phone) = p.phone {
                    metadata.insert("phone".to_string(), phone.into());
                }
                metadata.insert("source".to_string(), self.name.into());
                Resource {
                    name: p.name.to_string(),
                    category: p.category,
                    latitude: p.latitude,
                    longitude: p.longitude,
                    address: p.address.to_string(),
                    distance_meters: query.distance_to(p.latitude, p.longitude),
                    metadata,
                }
            })
            .collect();
        Ok(finalize(resources, query, true))
    }
}
