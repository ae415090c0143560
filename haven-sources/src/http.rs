//! Shared HTTP plumbing: status and transport classification, JSON decoding.

use std::time::Duration;

use haven_core::HavenError;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Build the default client used by the HTTP sources.
pub(crate) fn default_client(provider: &str) -> Result<reqwest::Client, HavenError> {
    reqwest::Client::builder()
        .user_agent(concat!("haven/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HavenError::Other(format!("{provider}: http client: {e}")))
}

/// Default per-request timeout applied by the HTTP sources.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Map a transport-level failure (no response received).
pub(crate) fn map_transport_err(provider: &str, e: &reqwest::Error, timeout: Duration) -> HavenError {
    if e.is_timeout() {
        HavenError::timeout(provider, timeout)
    } else {
        HavenError::network(provider, e.to_string())
    }
}

/// Map a non-success status code. Returns `None` for 2xx.
pub(crate) fn map_status(provider: &str, status: StatusCode, what: &str) -> Option<HavenError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND => HavenError::not_found(provider, what),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HavenError::Unauthorized {
            provider: provider.to_string(),
            status: status.as_u16(),
        },
        other => HavenError::Status {
            provider: provider.to_string(),
            status: other.as_u16(),
        },
    })
}

/// Send `req` bounded by `timeout`, classify the outcome, and decode a 2xx body as `T`.
///
/// A body that cannot be decoded is a `Validation` error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: &str,
    what: &str,
    req: RequestBuilder,
    timeout: Duration,
) -> Result<T, HavenError> {
    let resp = req
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| map_transport_err(provider, &e, timeout))?;
    if let Some(err) = map_status(provider, resp.status(), what) {
        return Err(err);
    }
    let body = resp
        .bytes()
        .await
        .map_err(|e| map_transport_err(provider, &e, timeout))?;
    serde_json::from_slice(&body)
        .map_err(|e| HavenError::validation(provider, format!("malformed {what} response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(map_status("p", StatusCode::OK, "x").is_none());
        assert!(matches!(
            map_status("p", StatusCode::NOT_FOUND, "x"),
            Some(HavenError::NotFound { .. })
        ));
        for code in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let e = map_status("p", code, "x").expect("error");
            assert!(matches!(e, HavenError::Unauthorized { .. }));
            assert!(!e.is_retryable());
        }
        for code in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_REQUEST,
        ] {
            let e = map_status("p", code, "x").expect("error");
            assert!(e.is_retryable(), "{code} should be retryable");
        }
    }
}
