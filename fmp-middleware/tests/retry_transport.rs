use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use fmp_core::{ApiRequest, FmpError, Resource, RetryConfig, Transport};
use fmp_middleware::RetryTransport;
use fmp_mock::{MockBehavior, MockTransport};
use serde_json::json;

fn fast(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        min_backoff_ms: 1,
        max_backoff_ms: 5,
        factor: 2,
        jitter_percent: 0,
    }
}

fn flaky(failures: u32, status: Option<u16>) -> (Arc<dyn Transport>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let t = <dyn Transport>::from_fn(move |_| {
        let n = seen.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            Err(FmpError::transport(status, "flaky"))
        } else {
            Ok(json!([{"ok": true}]))
        }
    });
    (t, calls)
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let (inner, calls) = flaky(2, Some(503));
    let t = RetryTransport::new(inner, fast(3));
    let v = t
        .get_json(&ApiRequest::bare(Resource::v3("quote/AAPL")))
        .await
        .unwrap();
    assert_eq!(v, json!([{"ok": true}]));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let (inner, calls) = flaky(10, None);
    let t = RetryTransport::new(inner, fast(4));
    let err = t
        .get_json(&ApiRequest::bare(Resource::v3("quote/AAPL")))
        .await
        .unwrap_err();
    assert_eq!(err, FmpError::transport(None, "flaky"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (inner, calls) = flaky(10, Some(403));
    let t = RetryTransport::new(inner, fast(5));
    assert!(
        t.get_json(&ApiRequest::bare(Resource::v3("quote/AAPL")))
            .await
            .is_err()
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn api_errors_pass_through_once() {
    let mock = Arc::new(MockTransport::new());
    mock.set_behavior(
        "v3/profile/AAPL",
        MockBehavior::Fail(FmpError::api("Limit Reach")),
    )
    .await;
    let t = RetryTransport::new(mock.clone(), fast(3));
    let err = t
        .get_json(&ApiRequest::bare(Resource::v3("profile/AAPL")))
        .await
        .unwrap_err();
    assert_eq!(err, FmpError::api("Limit Reach"));
    assert_eq!(mock.calls_to("v3/profile/AAPL").await, 1);
    assert_eq!(t.name(), "fmp-mock");
}
