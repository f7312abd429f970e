//! HTTP handlers for the counting service.

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::state::CounterState;

/// Liveness: always 200, echoes the path that was hit.
pub async fn health(uri: Uri) -> impl IntoResponse {
    (StatusCode::OK, format!("Hello, you've hit {}\n", uri.path()))
}

/// Increment and report the counter.
pub async fn count(State(state): State<CounterState>) -> Response {
    let record = state.next();
    match serde_json::to_string(&record) {
        Ok(body) => {
            tracing::debug!(count = record.count, "served count");
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "count encode failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "count encode failed").into_response()
        }
    }
}
