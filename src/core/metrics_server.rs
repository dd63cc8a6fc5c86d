//! HTTP server for exposing Prometheus metrics
//!
//! Runs on a separate port (METRICS_PORT, default 9090) when METRICS_ENABLED=true.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
struct AppState {
    start_time: Instant,
}

/// Builds the router. Split out from [`start_metrics_server`] for tests.
fn router() -> Router {
    let state = AppState {
        start_time: Instant::now(),
    };

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}

/// Start the metrics HTTP server
///
/// Exposes:
/// - /metrics - Prometheus metrics in text format
/// - /health - Liveness check with uptime
///
/// Returns when `shutdown` is cancelled.
pub async fn start_metrics_server(port: u16, shutdown: CancellationToken) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting metrics server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        ),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain".to_string())],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health_status = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "grabbot",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, axum::Json(health_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_stops_on_cancel() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(start_metrics_server(0, shutdown.clone()));
        shutdown.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("server should stop after cancel")
            .expect("task should not panic");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let state = Arc::new(AppState {
            start_time: Instant::now(),
        });
        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_ok() {
        crate::core::metrics::record_request("delivered");
        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
