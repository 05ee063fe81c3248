// GET handlers: metrics, version, api/info

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::AppState;
use crate::error::CollectError;
use crate::version::{NAME, VERSION};

/// GET /metrics runs a fresh collection cycle and returns exposition text.
/// Any dataset that failed outright turns the whole response into a 500.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.collector.collect().await;
    match snapshot.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(err) => {
            tracing::error!(error = %err, operation = "metrics", "collection failed");
            let message = match err {
                CollectError::SourceUnavailable { dataset, .. } => dataset.failure_message(),
                _ => "Error collecting metrics",
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("{}\n", message),
            )
        }
    }
}

/// GET /version returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info returns the host identity stamped on every metric.
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.collector.host().as_ref().clone())
}
