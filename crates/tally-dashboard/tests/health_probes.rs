//! Liveness, readiness and metrics endpoints.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use tally_dashboard::app_state::AppState;
use tally_dashboard::router::build_router;

use common::{new_log, test_config, Scripted, ScriptedFetcher};

async fn get(state: &AppState, path: &str) -> (StatusCode, String) {
    let res = build_router(state.clone())
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn state_with(script: Vec<Scripted>) -> AppState {
    let fetcher = ScriptedFetcher::new(script, new_log());
    AppState::with_fetcher(test_config("http://127.0.0.1:9"), fetcher)
}

#[tokio::test]
async fn liveness_always_ok() {
    let state = state_with(vec![Scripted::Unreachable]);
    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello, you've hit /health\n");
}

#[tokio::test]
async fn readiness_unhealthy_before_first_fetch() {
    let state = state_with(vec![]);
    assert_eq!(get(&state, "/health/api").await, (StatusCode::SERVICE_UNAVAILABLE, "failures: 0".into()));
}

#[tokio::test]
async fn readiness_tracks_consecutive_failures_then_recovers() {
    let state = state_with(vec![
        Scripted::Unreachable,
        Scripted::Unreachable,
        Scripted::Unreachable,
        Scripted::Count(9, "h1"),
    ]);

    for _ in 0..3 {
        state.relay().fetch().await;
    }
    assert_eq!(get(&state, "/health/api").await, (StatusCode::SERVICE_UNAVAILABLE, "failures: 3".into()));

    // probing does not change state
    assert_eq!(get(&state, "/health/api").await, (StatusCode::SERVICE_UNAVAILABLE, "failures: 3".into()));

    state.relay().fetch().await;
    assert_eq!(get(&state, "/health/api").await, (StatusCode::OK, "ok".into()));
}

#[tokio::test]
async fn metrics_expose_fetch_outcomes_and_tracker() {
    let state = state_with(vec![Scripted::Count(1, "h1"), Scripted::Unreachable]);
    state.relay().fetch().await;
    state.relay().fetch().await;

    let (status, body) = get(&state, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("tally_upstream_fetches_total{outcome=\"ok\"} 1"), "{body}");
    assert!(body.contains("tally_upstream_fetches_total{outcome=\"error\"} 1"), "{body}");
    assert!(body.contains("tally_upstream_consecutive_failures 1"), "{body}");
    assert!(body.contains("tally_upstream_ok 0"), "{body}");
    assert!(body.contains("# TYPE tally_upstream_fetch_duration_millis histogram"), "{body}");
}
