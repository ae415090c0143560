use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use haven_core::{Category, HavenError, Resource, SourceAdapter, SourceQuery, finalize};

use crate::http;

/// Environment variable holding the live directory endpoint.
pub const DIRECTORY_URL_ENV: &str = "HAVEN_DIRECTORY_URL";
/// Endpoint used when [`DIRECTORY_URL_ENV`] is unset.
pub const DEFAULT_DIRECTORY_URL: &str = "http://localhost:3000/v1/211/json";

const SOURCE_LABEL: &str = "211 San Diego";

#[derive(Debug, Deserialize)]
struct DirectoryBody {
    data: Vec<DirectoryRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectoryRecord {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
    contact: Option<String>,
    hours_json: Option<Value>,
    status: Option<String>,
    eligibility_notes: Option<String>,
    capacity_available: Option<Value>,
    wait_minutes: Option<Value>,
    last_verified_at: Option<String>,
}

/// Adapter for the 211 live resource directory.
///
/// The endpoint returns the whole directory in one `{"data": [...]}` document
/// with no server-side filtering, so radius and category are applied here.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl DirectorySource {
    /// Source name used for logs and retry overrides.
    pub const NAME: &'static str = "haven-directory";

    /// Create an adapter for the given endpoint URL.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `url` does not parse, or `Other` if the HTTP
    /// client cannot be constructed.
    pub fn new(url: &str) -> Result<Self, HavenError> {
        let url = Url::parse(url)
            .map_err(|e| HavenError::InvalidArg(format!("directory url {url:?}: {e}")))?;
        Ok(Self {
            client: http::default_client(Self::NAME)?,
            url,
            timeout: http::DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Create an adapter from `HAVEN_DIRECTORY_URL`, falling back to the local default.
    ///
    /// # Errors
    /// Same as [`DirectorySource::new`].
    pub fn from_env() -> Result<Self, HavenError> {
        let url = std::env::var(DIRECTORY_URL_ENV)
            .unwrap_or_else(|_| DEFAULT_DIRECTORY_URL.to_string());
        Self::new(&url)
    }

    /// Use a caller-provided HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Per-request transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

/// Normalize a timestamp to RFC 3339 UTC when it parses; otherwise pass it through.
fn normalize_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true);
        }
    }
    raw.to_string()
}

fn to_resource(record: DirectoryRecord, query: &SourceQuery) -> Option<Resource> {
    let Some(name) = record.name.filter(|n| !n.trim().is_empty()) else {
        #[cfg(feature = "tracing")]
        tracing::debug!("skipping record without a name");
        return None;
    };
    let (latitude, longitude) = match (record.lat, record.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
        _ => {
            #[cfg(feature = "tracing")]
            tracing::debug!(name = %name, "skipping record without coordinates");
            return None;
        }
    };

    let mut metadata = BTreeMap::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(v) = value.filter(|v| !v.is_null()) {
            metadata.insert(key.to_string(), v);
        }
    };
    put("phone", record.contact.map(Value::from));
    put("hours", record.hours_json);
    put("status", record.status.map(Value::from));
    put("eligibility", record.eligibility_notes.map(Value::from));
    put("capacity_available", record.capacity_available);
    put("wait_minutes", record.wait_minutes);
    put(
        "last_verified",
        record
            .last_verified_at
            .as_deref()
            .map(|s| Value::from(normalize_timestamp(s))),
    );
    put("source", Some(Value::from(SOURCE_LABEL)));

    Some(Resource {
        distance_meters: query.distance_to(latitude, longitude),
        name,
        category: record
            .kind
            .as_deref()
            .map_or(Category::Other, Category::from_label),
        latitude,
        longitude,
        address: record.address.unwrap_or_default(),
        metadata,
    })
}

#[async_trait]
impl SourceAdapter for DirectorySource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "haven::sources::directory::fetch",
            skip(self, query),
            fields(category = %query.category, radius = query.radius_meters),
        )
    )]
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError> {
        let req = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        let body: DirectoryBody = http::get_json(Self::NAME, "directory", req, self.timeout).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(records = body.data.len(), "directory records received");

        let resources = body
            .data
            .into_iter()
            .filter_map(|r| to_resource(r, query))
            .collect();
        Ok(finalize(resources, query, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_normalize_when_parseable() {
        assert_eq!(
            normalize_timestamp("2024-11-02T08:30:00-07:00"),
            "2024-11-02T15:30:00Z"
        );
        assert_eq!(
            normalize_timestamp("2024-11-02 08:30:00"),
            "2024-11-02T08:30:00Z"
        );
        assert_eq!(normalize_timestamp("yesterday"), "yesterday");
    }
}
