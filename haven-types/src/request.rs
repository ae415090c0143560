//! Inbound lookup contract exchanged with the voice/UI layer.

use serde::{Deserialize, Serialize};

use crate::{Category, HavenError, Resource};

/// A lookup request as received from an upstream caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Query latitude in decimal degrees.
    pub latitude: f64,
    /// Query longitude in decimal degrees.
    pub longitude: f64,
    /// Requested assistance category.
    pub category: Category,
    /// Optional search radius override, in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
}

/// Response envelope for a lookup.
///
/// Serialized untagged: `{ "resources": [...] }` on success,
/// `{ "error": "...", "retryable": bool }` on total failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResponse {
    /// Merged, de-duplicated resources sorted by distance.
    Resources {
        /// Resources, nearest first.
        resources: Vec<Resource>,
    },
    /// Every source failed, or the request was invalid.
    Error {
        /// User-facing message.
        error: String,
        /// Whether inviting the user to try again makes sense.
        retryable: bool,
    },
}

impl LookupResponse {
    /// True for the success variant.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Resources { .. })
    }
}

impl From<Result<Vec<Resource>, HavenError>> for LookupResponse {
    fn from(res: Result<Vec<Resource>, HavenError>) -> Self {
        match res {
            Ok(resources) => Self::Resources { resources },
            Err(e) => Self::Error {
                error: e.user_message(),
                retryable: e.is_retryable(),
            },
        }
    }
}
