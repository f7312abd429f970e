//! Dashboard relay binary.
//!
//! - Push channel: `/socket` (WebSocket)
//! - Probes: `/health`, `/health/api`
//! - Metrics: `/metrics`
//!
//! Configured from `PORT`, `COUNTING_SERVICE_URL` and an optional YAML file
//! named by `DASHBOARD_CONFIG`.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use tally_dashboard::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let listen = cfg.listen_addr();
    let upstream = cfg.upstream.url.clone();

    let state = match app_state::AppState::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "state init failed");
            return ExitCode::FAILURE;
        }
    };
    let app = router::build_router(state);

    let listener = match tokio::net::TcpListener::bind(&listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%listen, %upstream, "tally-dashboard starting (PORT / COUNTING_SERVICE_URL to change)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
