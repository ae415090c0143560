#![allow(dead_code)]

use std::time::Duration;

use haven::{Backoff, Category, Haven, HavenError, Resource, RetryPolicy};
use haven_mock::{MockBehavior, MockController, MockSource};

pub const SD_LAT: f64 = 32.7157;
pub const SD_LON: f64 = -117.1611;

pub fn r(name: &str, lat: f64, lon: f64, dist: f64) -> Resource {
    haven_mock::resource(name, Category::Shelter, lat, lon, dist)
}

/// Policy without backoff so failure paths stay short.
pub fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        timeout: Duration::from_secs(8),
        backoff: Backoff::Fixed(Duration::ZERO),
        jitter_percent: 0,
    }
}

pub fn network_err(src: &str) -> HavenError {
    HavenError::network(src, "connection reset")
}

pub fn validation_err(src: &str) -> HavenError {
    HavenError::validation(src, "missing data array")
}

/// Two scripted sources "A" and "B" registered in that order.
pub fn two_sources(a: MockBehavior, b: MockBehavior) -> (Haven, MockController, MockController) {
    let (sa, ca) = MockSource::scripted("A", a);
    let (sb, cb) = MockSource::scripted("B", b);
    let haven = Haven::builder()
        .with_source(sa)
        .with_source(sb)
        .retry_policy(quick_policy(2))
        .build()
        .expect("valid haven");
    (haven, ca, cb)
}

pub fn names(list: &[Resource]) -> Vec<&str> {
    list.iter().map(|r| r.name.as_str()).collect()
}
