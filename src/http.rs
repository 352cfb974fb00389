//! HTTP server for the Prometheus metrics endpoint.

use axum::{Router, routing::get};
use std::net::SocketAddr;

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve `GET /metrics` on `0.0.0.0:port` until the process exits.
///
/// Bind failures are logged; the chat listener keeps running without metrics.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind metrics endpoint");
            return;
        }
    };
    tracing::info!(%addr, "Prometheus metrics endpoint listening");

    if let Err(e) = axum::serve(listener, router()).await {
        tracing::error!(error = %e, "Metrics endpoint error");
    }
}
