//! Operational HTTP endpoints.
//!
//! - `/health`     : liveness, always 200
//! - `/health/api` : upstream readiness (503 with the consecutive failure count)
//! - `/metrics`    : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::relay::VISITS_GROUP;

pub async fn health(uri: Uri) -> impl IntoResponse {
    (StatusCode::OK, format!("Hello, you've hit {}\n", uri.path()))
}

/// Reads the tracker only; probing never changes health state.
pub async fn health_api(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.tracker().snapshot();
    if snap.ok {
        (StatusCode::OK, "ok".to_string())
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, format!("failures: {}", snap.failures))
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let snap = state.tracker().snapshot();
    let realtime = state.realtime();
    let visits = i64::try_from(realtime.groups.len(VISITS_GROUP)).unwrap_or(i64::MAX);
    let failures = i64::try_from(snap.failures).unwrap_or(i64::MAX);

    let extra = [
        ("tally_upstream_ok", i64::from(snap.ok)),
        ("tally_upstream_consecutive_failures", failures),
        ("tally_visits_members", visits),
    ];
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
