//! HTTP endpoint telling uptime monitors the process is up.

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tracing::{error, info, info_span, Instrument};

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
}

/// Serves the liveness routes in the background. Failing to bind is logged and leaves the bot
/// running.
pub fn spawn(bind_addr: String) {
    tokio::spawn(
        async move {
            if let Err(err) = serve(&bind_addr).await {
                error!("Liveness endpoint stopped: {err}");
            }
        }
        .instrument(info_span!("liveness")),
    );
}

async fn serve(bind_addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!("Liveness endpoint listening on {bind_addr}");

    axum::serve(listener, router()).await?;

    Ok(())
}

async fn home() -> &'static str {
    "I'm alive!"
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}
