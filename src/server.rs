//! HTTP surface of the exporter.
//!
//! Serves the Prometheus exposition at `/metrics`, a health check and a small
//! landing page. All encoding is delegated to the `prometheus` crate.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;
use std::future::Future;
use tokio::net::TcpListener;

use crate::utils::error::Result;

const LANDING_PAGE: &str = r#"<html>
<head><title>PromCon Registration Exporter</title></head>
<body>
<h1>PromCon Registration Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Gather every registered collector and render the text exposition.
///
/// Collectors may block on upstream I/O, so call this off the async workers.
pub fn encode_metrics(registry: &Registry) -> Result<Vec<u8>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

async fn metrics(State(state): State<AppState>) -> Response {
    let registry = state.registry.clone();
    match tokio::task::spawn_blocking(move || encode_metrics(&registry)).await {
        Ok(Ok(buffer)) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            buffer,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Metrics gather task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub async fn bind(address: &str) -> Result<TcpListener> {
    Ok(TcpListener::bind(address).await?)
}

/// Serve until `shutdown` resolves.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
