//! Axum router wiring for the counting service.
//!
//! `/health` is the liveness probe for any method; every other path counts.

use axum::{routing::any, Router};

use crate::{handlers, state::CounterState};

pub fn build_router(state: CounterState) -> Router {
    Router::new()
        .route("/health", any(handlers::health))
        .fallback(handlers::count)
        .with_state(state)
}
