use async_trait::async_trait;

use crate::geo;
use haven_types::{Category, Coordinates, HavenError, Resource, SourceKey};

/// Parameters handed to every source for a single lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceQuery {
    /// Query point; every distance is measured from here.
    pub origin: Coordinates,
    /// Requested category. `Other` never filters.
    pub category: Category,
    /// Maximum distance from `origin` for a resource to be kept.
    pub radius_meters: f64,
}

impl SourceQuery {
    /// Build a query from its parts.
    #[must_use]
    pub const fn new(origin: Coordinates, category: Category, radius_meters: f64) -> Self {
        Self {
            origin,
            category,
            radius_meters,
        }
    }

    /// Distance from the query point to the given coordinates, in meters.
    #[must_use]
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        geo::distance(
            self.origin.latitude(),
            self.origin.longitude(),
            latitude,
            longitude,
        )
    }
}

/// A backend that can list resources near a point.
///
/// Implementations issue one network call per `fetch`, normalize the raw
/// records into [`Resource`], and classify failures through [`HavenError`]
/// so the retry executor can tell transient faults from contract errors.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// A stable identifier for retry overrides and logs (e.g., "haven-directory").
    fn name(&self) -> &'static str;

    /// Canonical source key constructed from the static name.
    fn key(&self) -> SourceKey {
        SourceKey::new(self.name())
    }

    /// Fetch resources around `query.origin`.
    ///
    /// The returned list is already filtered by radius (and by category when
    /// the backend cannot filter server-side) and sorted nearest first.
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError>;
}

/// Shared post-processing applied by adapters after mapping raw records.
///
/// - drops resources farther than `query.radius_meters`
/// - when `filter_category` is set, drops resources the requested category does
///   not admit (`Other` admits everything)
/// - sorts ascending by distance
#[must_use]
pub fn finalize(
    mut resources: Vec<Resource>,
    query: &SourceQuery,
    filter_category: bool,
) -> Vec<Resource> {
    resources.retain(|r| {
        r.distance_meters <= query.radius_meters
            && (!filter_category || query.category.admits(r.category))
    });
    crate::merge::sort_by_distance(&mut resources);
    resources
}
