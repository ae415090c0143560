mod helpers;

use std::time::Duration;

use haven::{Category, Haven, HavenError};
use haven_mock::{MockBehavior, MockSource};
use helpers::*;

#[tokio::test(start_paused = true)]
async fn san_diego_shelter_scenario_returns_a_unmodified() {
    let downtown = r("Downtown Safe Sleep Center", 32.7216, -117.1652, 820.0);
    let (haven, _a, _b) = two_sources(
        MockBehavior::Return(vec![downtown.clone()]),
        MockBehavior::Return(vec![]),
    );
    let got = haven.lookup(32.7157, -117.1611, Category::Shelter).await.expect("ok");
    assert_eq!(got, vec![downtown]);
}

#[tokio::test(start_paused = true)]
async fn duplicate_across_sources_collapses_to_first_seen() {
    let mut a1 = r("Father Joe's Villages", 32.7069, -117.1486, 1500.0);
    a1.metadata.insert("source".into(), serde_json::json!("A"));
    let a2 = r("Downtown Safe Sleep Center", 32.7216, -117.1652, 820.0);
    let mut b1 = r("FATHER JOE'S VILLAGES", 32.70692, -117.14858, 1499.0);
    b1.metadata.insert("source".into(), serde_json::json!("B"));

    let (haven, _a, _b) = two_sources(
        MockBehavior::Return(vec![a1, a2]),
        MockBehavior::Return(vec![b1]),
    );
    let got = haven.lookup(SD_LAT, SD_LON, Category::Shelter).await.expect("ok");
    assert_eq!(got.len(), 2);
    assert_eq!(names(&got), ["Downtown Safe Sleep Center", "Father Joe's Villages"]);
    assert_eq!(got[1].metadata["source"], serde_json::json!("A"));
}

#[tokio::test(start_paused = true)]
async fn one_terminal_failure_is_silent() {
    let list = vec![
        r("One", 32.716, -117.161, 50.0),
        r("Two", 32.717, -117.161, 150.0),
        r("Three", 32.718, -117.161, 250.0),
    ];
    let (haven, a, b) = two_sources(
        MockBehavior::Fail(validation_err("A")),
        MockBehavior::Return(list.clone()),
    );
    let got = haven.lookup(SD_LAT, SD_LON, Category::Shelter).await.expect("partial ok");
    assert_eq!(got, list);
    assert_eq!(a.calls(), 1, "non-retryable is not retried");
    assert_eq!(b.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn aggregate_is_retryable_when_any_source_timed_out() {
    let (sa, _a) = MockSource::scripted("A", MockBehavior::Fail(validation_err("A")));
    let (sb, b) = MockSource::scripted("B", MockBehavior::Hang);
    let haven = Haven::builder()
        .with_source(sa)
        .with_source(sb)
        .build()
        .expect("valid haven");

    let err = haven
        .lookup(SD_LAT, SD_LON, Category::Shelter)
        .await
        .expect_err("all failed");
    match &err {
        HavenError::AllSourcesFailed { retryable, errors } => {
            assert!(*retryable);
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], HavenError::Validation { .. }));
            assert!(matches!(errors[1], HavenError::RetriesExhausted { attempts: 2, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(b.calls(), 2);
    let leaves = err.flatten();
    assert!(leaves.iter().any(|e| matches!(e, HavenError::Timeout { timeout_ms: 8_000, .. })));
}

#[tokio::test(start_paused = true)]
async fn aggregate_is_terminal_when_every_failure_is() {
    let (haven, _a, _b) = two_sources(
        MockBehavior::Fail(validation_err("A")),
        MockBehavior::Fail(HavenError::Unauthorized {
            provider: "B".into(),
            status: 401,
        }),
    );
    let err = haven
        .lookup(SD_LAT, SD_LON, Category::Shelter)
        .await
        .expect_err("all failed");
    assert!(!err.is_retryable());
    assert_eq!(err.user_message(), "Resource lookup is unavailable right now.");
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_within_one_lookup() {
    let recovered = r("Recovered", 32.716, -117.161, 100.0);
    let (haven, a, _b) = two_sources(
        MockBehavior::FailThenReturn {
            failures: 1,
            error: network_err("A"),
            resources: vec![recovered.clone()],
        },
        MockBehavior::Return(vec![]),
    );
    let got = haven.lookup(SD_LAT, SD_LON, Category::Shelter).await.expect("ok");
    assert_eq!(got, vec![recovered]);
    assert_eq!(a.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn sources_run_concurrently() {
    let (sa, _a) = MockSource::scripted(
        "A",
        MockBehavior::Delay(Duration::from_secs(3), vec![r("Slow A", 32.716, -117.161, 10.0)]),
    );
    let (sb, _b) = MockSource::scripted(
        "B",
        MockBehavior::Delay(Duration::from_secs(3), vec![r("Slow B", 32.717, -117.161, 20.0)]),
    );
    let haven = Haven::builder()
        .with_source(sa)
        .with_source(sb)
        .build()
        .expect("valid haven");

    let start = tokio::time::Instant::now();
    let got = haven.lookup(SD_LAT, SD_LON, Category::Shelter).await.expect("ok");
    let elapsed = start.elapsed();
    assert_eq!(names(&got), ["Slow A", "Slow B"]);
    assert!(elapsed < Duration::from_secs(4), "fan-out should overlap, took {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn per_source_policy_overrides_default() {
    let (sa, a) = MockSource::scripted("A", MockBehavior::Fail(network_err("A")));
    let (sb, b) = MockSource::scripted("B", MockBehavior::Fail(network_err("B")));
    let haven = Haven::builder()
        .with_source(sa)
        .with_source(sb)
        .retry_policy(quick_policy(2))
        .source_policy(haven::SourceKey::new("B"), quick_policy(4))
        .build()
        .expect("valid haven");

    let err = haven
        .lookup(SD_LAT, SD_LON, Category::Food)
        .await
        .expect_err("all failed");
    assert!(err.is_retryable());
    assert_eq!(a.calls(), 2);
    assert_eq!(b.calls(), 4);
}
