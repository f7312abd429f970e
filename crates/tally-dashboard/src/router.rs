//! Axum router wiring.
//!
//! `/socket` upgrades to the push channel; `/health`, `/health/api` and
//! `/metrics` are operational. Anything else is served from the assets
//! directory when it exists.

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/socket", get(transport::ws::ws_upgrade))
        .route("/health", get(ops::health))
        .route("/health/api", get(ops::health_api))
        .route("/metrics", get(ops::metrics));

    let assets = &state.cfg().server.assets_dir;
    let router = if Path::new(assets).is_dir() {
        router.fallback_service(ServeDir::new(assets))
    } else {
        tracing::debug!(%assets, "assets dir missing; static files disabled");
        router
    };

    router.with_state(state)
}
