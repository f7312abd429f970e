#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use tally_core::protocol::count::CountRecord;
use tally_counter::{router::build_router, CounterConfig, CounterState};

async fn get(app: axum::Router, path: &str) -> (StatusCode, String) {
    let res = app
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn counts_up_from_one() {
    let state = CounterState::new("h1");
    let app = build_router(state.clone());

    for expected in 1..=3u64 {
        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        let rec: CountRecord = serde_json::from_str(&body).unwrap();
        assert_eq!(rec, CountRecord { count: expected, hostname: "h1".into() });
    }
    assert_eq!(state.current(), 3);
}

#[tokio::test]
async fn any_path_counts() {
    let app = build_router(CounterState::new("h1"));
    let (_, body) = get(app.clone(), "/api/whatever").await;
    let rec: CountRecord = serde_json::from_str(&body).unwrap();
    assert_eq!(rec.count, 1);
}

#[tokio::test]
async fn health_does_not_count() {
    let state = CounterState::new("h1");
    let app = build_router(state.clone());

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello, you've hit /health\n");
    assert_eq!(state.current(), 0);
}

#[tokio::test]
async fn health_answers_any_method() {
    let state = CounterState::new("h1");
    let app = build_router(state.clone());

    for method in ["POST", "PUT", "DELETE"] {
        let res = app
            .clone()
            .oneshot(Request::builder().method(method).uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{method} /health");
    }
    assert_eq!(state.current(), 0);
}

#[tokio::test]
async fn concurrent_requests_get_distinct_counts() {
    let state = CounterState::new("h1");
    let app = build_router(state.clone());

    let mut tasks = Vec::new();
    for _ in 0..64 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let (_, body) = get(app, "/").await;
            serde_json::from_str::<CountRecord>(&body).unwrap().count
        }));
    }

    let mut seen = HashSet::new();
    for t in tasks {
        assert!(seen.insert(t.await.unwrap()));
    }
    assert_eq!(seen, (1..=64).collect::<HashSet<u64>>());
}

#[test]
fn config_defaults_and_overrides() {
    let cfg = CounterConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg.port, 80);
    assert!(!cfg.hostname.is_empty());

    let cfg = CounterConfig::from_lookup(|k| match k {
        "PORT" => Some("9001".into()),
        "HOSTNAME" => Some("counter-a".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.listen_addr(), "0.0.0.0:9001");
    assert_eq!(cfg.hostname, "counter-a");

    assert!(CounterConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".into())).is_err());
}
