use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use haven_core::{
    Backoff, Category, Coordinates, HavenError, RetryPolicy, SourceAdapter, SourceQuery,
};
use haven_middleware::{RetryExecutor, RetryingSource};
use haven_mock::{MockBehavior, MockSource, resource};

fn policy(max_attempts: u32, timeout_ms: u64, backoff: Backoff) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        timeout: Duration::from_millis(timeout_ms),
        backoff,
        jitter_percent: 0,
    }
}

fn query() -> SourceQuery {
    let origin = Coordinates::new(32.7157, -117.1611).expect("valid coordinates");
    SourceQuery::new(origin, Category::Shelter, 5_000.0)
}

#[tokio::test(start_paused = true)]
async fn success_on_first_attempt_calls_once() {
    let exec = RetryExecutor::new(RetryPolicy::resource_lookup());
    let calls = AtomicUsize::new(0);
    let out = exec
        .execute("p", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, HavenError>(7) }
        })
        .await
        .expect("ok");
    assert_eq!(out, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_aborts_immediately_with_raw_error() {
    let exec = RetryExecutor::new(policy(5, 1_000, Backoff::Fixed(Duration::from_secs(1))));
    let calls = AtomicUsize::new(0);
    let err = exec
        .execute("p", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(HavenError::validation("p", "missing data")) }
        })
        .await
        .expect_err("fails");
    assert_eq!(err, HavenError::validation("p", "missing data"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retryable_exhausts_attempts_and_keeps_retryability() {
    let exec = RetryExecutor::new(policy(3, 1_000, Backoff::Fixed(Duration::from_millis(10))));
    let calls = AtomicUsize::new(0);
    let err = exec
        .execute("p", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(HavenError::Status { provider: "p".into(), status: 503 }) }
        })
        .await
        .expect_err("fails");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match &err {
        HavenError::RetriesExhausted { provider, attempts, last } => {
            assert_eq!(provider, "p");
            assert_eq!(*attempts, 3);
            assert!(matches!(**last, HavenError::Status { status: 503, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn zero_attempts_is_treated_as_one() {
    let exec = RetryExecutor::new(policy(0, 1_000, Backoff::Fixed(Duration::ZERO)));
    let calls = AtomicUsize::new(0);
    let _ = exec
        .execute("p", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(HavenError::network("p", "reset")) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_attempt_times_out_and_is_retried() {
    let (mock, controller) = MockSource::scripted("slow", MockBehavior::Hang);
    let src = RetryingSource::new(mock, policy(2, 8_000, Backoff::Fixed(Duration::from_secs(2))));

    let start = tokio::time::Instant::now();
    let err = src.fetch(&query()).await.expect_err("times out");
    let elapsed = start.elapsed();

    assert_eq!(controller.calls(), 2);
    match &err {
        HavenError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(*attempts, 2);
            assert_eq!(
                **last,
                HavenError::Timeout { provider: "slow".into(), timeout_ms: 8_000 }
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
    // 8s + 2s backoff + 8s
    assert!(elapsed >= Duration::from_secs(18) && elapsed < Duration::from_millis(18_100));
}

#[tokio::test(start_paused = true)]
async fn transient_failure_then_success() {
    let r = resource("Downtown Safe Sleep Center", Category::Shelter, 32.7216, -117.1652, 820.0);
    let (mock, controller) = MockSource::scripted(
        "flaky",
        MockBehavior::FailThenReturn {
            failures: 1,
            error: HavenError::network("flaky", "connection reset"),
            resources: vec![r.clone()],
        },
    );
    let src = RetryingSource::new(mock, RetryPolicy::resource_lookup());
    let got = src.fetch(&query()).await.expect("recovers");
    assert_eq!(got, vec![r]);
    assert_eq!(controller.calls(), 2);
    assert_eq!(src.name(), "flaky");
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_doubles_per_attempt() {
    let exec = RetryExecutor::new(RetryPolicy::upstream_request());
    let calls = AtomicUsize::new(0);
    let start = tokio::time::Instant::now();
    let _ = exec
        .execute("p", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(HavenError::network("p", "down")) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 2s after the first failure, 4s after the second
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_millis(6_100));
}

#[test]
fn jitter_only_lengthens_delays() {
    let exec = RetryExecutor::new(RetryPolicy {
        jitter_percent: 50,
        ..RetryPolicy::resource_lookup()
    });
    for _ in 0..50 {
        let d = exec.delay_after(0);
        assert!(d >= Duration::from_secs(2) && d < Duration::from_secs(3), "got {d:?}");
    }
}
