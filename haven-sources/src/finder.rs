use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use haven_core::{Category, HavenError, Resource, SourceAdapter, SourceQuery, finalize};

use crate::http;

/// Environment variable holding the edge-function base URL.
pub const FINDER_URL_ENV: &str = "HAVEN_FINDER_URL";
/// Environment variable holding the optional API key.
pub const FINDER_KEY_ENV: &str = "HAVEN_FINDER_KEY";
/// Base URL used when [`FINDER_URL_ENV`] is unset.
pub const DEFAULT_FINDER_URL: &str = "http://127.0.0.1:54321";

const FUNCTION_PATH: &str = "functions/v1/resource-finder";
const SOURCE_LABEL: &str = "resource-finder";

// A failed call may still come back 200 with `success: false`.
#[derive(Debug, Deserialize)]
struct FinderBody {
    #[serde(default)]
    resources: Option<Vec<FinderRecord>>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<FinderFault>,
}

#[derive(Debug, Deserialize)]
struct FinderFault {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FinderRecord {
    id: Option<Value>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
    phone: Option<String>,
    hours: Option<String>,
    is_open: Option<bool>,
    pet_friendly: Option<bool>,
    verified_on: Option<String>,
}

/// Adapter for the `resource-finder` edge function.
///
/// Radius and category are filtered server-side; this adapter still applies
/// the radius to its recomputed distances and sorts the result.
#[derive(Clone)]
pub struct FinderSource {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for FinderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FinderSource {
    /// Source name used for logs and retry overrides.
    pub const NAME: &'static str = "haven-finder";

    /// Create an adapter rooted at `base_url` (the project URL, without the function path).
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` does not parse, or `Other` if the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, HavenError> {
        let invalid = |e: url::ParseError| HavenError::InvalidArg(format!("finder url {base_url:?}: {e}"));
        let mut base = Url::parse(base_url).map_err(invalid)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(FUNCTION_PATH).map_err(invalid)?;
        Ok(Self {
            client: http::default_client(Self::NAME)?,
            endpoint,
            api_key: None,
            timeout: http::DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Create an adapter from `HAVEN_FINDER_URL` and `HAVEN_FINDER_KEY`.
    ///
    /// # Errors
    /// Same as [`FinderSource::new`].
    pub fn from_env() -> Result<Self, HavenError> {
        let base =
            std::env::var(FINDER_URL_ENV).unwrap_or_else(|_| DEFAULT_FINDER_URL.to_string());
        let source = Self::new(&base)?;
        Ok(match std::env::var(FINDER_KEY_ENV) {
            Ok(key) if !key.is_empty() => source.with_api_key(key),
            _ => source,
        })
    }

    /// Send `Authorization: Bearer <key>` and `apikey: <key>` on every request.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
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

    /// Fully-qualified function endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Backend type label for a requested category, if it filters at all.
    ///
    /// The backend has no hygiene type; those resources are filed under `other`.
    const fn type_param(category: Category) -> Option<&'static str> {
        match category {
            Category::Shelter => Some("shelter"),
            Category::Food => Some("food"),
            Category::Medical => Some("medical"),
            Category::Hygiene => Some("other"),
            Category::Other => None,
        }
    }

    fn request_url(&self, query: &SourceQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("lat", &query.origin.latitude().to_string());
            qp.append_pair("lng", &query.origin.longitude().to_string());
            if let Some(kind) = Self::type_param(query.category) {
                qp.append_pair("type", kind);
            }
            qp.append_pair("radius", &query.radius_meters.to_string());
            qp.append_pair("is_open", "true");
        }
        url
    }
}

fn to_resource(record: FinderRecord, query: &SourceQuery) -> Option<Resource> {
    let Some(name) = record.name.filter(|n| !n.trim().is_empty()) else {
        #[cfg(feature = "tracing")]
        tracing::debug!("skipping record without a name");
        return None;
    };
    let (latitude, longitude) = match (record.latitude, record.longitude) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
        _ => {
            #[cfg(feature = "tracing")]
            tracing::debug!(name = %name, "skipping record without coordinates");
            return None;
        }
    };

    let mut metadata = BTreeMap::new();
    if let Some(id) = record.id.filter(|v| !v.is_null()) {
        metadata.insert("id".to_string(), id);
    }
    if let Some(phone) = record.phone {
        metadata.insert("phone".to_string(), Value::from(phone));
    }
    if let Some(hours) = record.hours {
        metadata.insert("hours".to_string(), Value::from(hours));
    }
    if let Some(open) = record.is_open {
        metadata.insert("is_open".to_string(), Value::from(open));
        let status = if open { "Open" } else { "Closed" };
        metadata.insert("status".to_string(), Value::from(status));
    }
    if let Some(pets) = record.pet_friendly {
        metadata.insert("pet_friendly".to_string(), Value::from(pets));
    }
    if let Some(verified) = record.verified_on {
        metadata.insert("last_verified".to_string(), Value::from(verified));
    }
    metadata.insert("source".to_string(), Value::from(SOURCE_LABEL));

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
impl SourceAdapter for FinderSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "haven::sources::finder::fetch",
            skip(self, query),
            fields(category = %query.category, radius = query.radius_meters),
        )
    )]
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<Resource>, HavenError> {
        let mut req = self
            .client
            .get(self.request_url(query))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key).header("apikey", key);
        }

        let body: FinderBody = http::get_json(Self::NAME, "resource-finder", req, self.timeout).await?;
        if body.success == Some(false) {
            let msg = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "request rejected".to_string());
            return Err(HavenError::rejected(Self::NAME, msg));
        }
        let records = body.resources.ok_or_else(|| {
            HavenError::validation(Self::NAME, "malformed resource-finder response: missing `resources`")
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(records = records.len(), "finder records received");

        let resources = records
            .into_iter()
            .filter_map(|r| to_resource(r, query))
            .collect();
        Ok(finalize(resources, query, false))
    }
}
