//! Canonical resource shape and the location primitives it is built from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HavenError;

/// Assistance category requested by a caller and carried by each resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    /// Emergency shelters, safe sleep and safe parking sites.
    Shelter,
    /// Food pantries, meal programs.
    Food,
    /// Clinics and medical outreach.
    Medical,
    /// Showers, restrooms, laundry.
    Hygiene,
    /// Catch-all; never used to filter results.
    Other,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Shelter,
        Self::Food,
        Self::Medical,
        Self::Hygiene,
        Self::Other,
    ];

    /// Lowercase label used in cache keys and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shelter => "shelter",
            Self::Food => "food",
            Self::Medical => "medical",
            Self::Hygiene => "hygiene",
            Self::Other => "other",
        }
    }

    /// Map a raw backend type label onto a category.
    ///
    /// Unknown or empty labels fall into [`Category::Other`].
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Other)
    }

    /// Whether a resource of category `candidate` satisfies a request for `self`.
    #[must_use]
    pub fn admits(self, candidate: Self) -> bool {
        self == Self::Other || self == candidate
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| HavenError::InvalidArg(format!("unknown category: {s:?}")))
    }
}

impl TryFrom<String> for Category {
    type Error = HavenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    /// Returns `InvalidArg` when latitude is outside `[-90, 90]` or longitude
    /// outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, HavenError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(HavenError::InvalidArg(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(HavenError::InvalidArg(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Round a coordinate to 3 decimal degrees (~110 m), folding `-0.0` into `0.0`.
#[must_use]
pub fn round3(v: f64) -> f64 {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 { 0.0 } else { r }
}

/// Cache key for a lookup: rounded coordinates plus category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookupKey(String);

impl LookupKey {
    /// Derive the key for a query point and category.
    #[must_use]
    pub fn new(origin: Coordinates, category: Category) -> Self {
        Self(format!(
            "{:.3},{:.3},{}",
            round3(origin.latitude()),
            round3(origin.longitude()),
            category
        ))
    }

    /// Borrow the rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point-of-service entity, normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Display name.
    pub name: String,
    /// Assistance category.
    pub category: Category,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Street address; empty when the source has none.
    pub address: String,
    /// Distance from the query point, computed per lookup.
    pub distance_meters: f64,
    /// Source-specific extras. Absent fields are omitted rather than defaulted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}
