//! Counting service binary.
//!
//! - `GET /health`: liveness
//! - any other path: increment and return `{"count", "hostname"}`

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use tally_counter::{router, CounterConfig, CounterState};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = match CounterConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let listen = cfg.listen_addr();
    let app = router::build_router(CounterState::new(cfg.hostname.clone()));

    let listener = match tokio::net::TcpListener::bind(&listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%listen, hostname = %cfg.hostname, "tally-counter serving (pass PORT to change)");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
