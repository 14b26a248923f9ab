//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub ffmpeg: String,
    pub environment: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Health check. Missing FFmpeg degrades the service (uploads are passed
/// through unconverted) but does not make it unhealthy. Probe details are only logged.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let available = state
        .ffmpeg_health
        .is_available(state.transcoder.as_ref(), state.probe_timeout())
        .await;

    let (status, ffmpeg) = if available {
        ("healthy", "available")
    } else {
        ("degraded", "unavailable")
    };

    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: status.to_string(),
            ffmpeg: ffmpeg.to_string(),
            environment: state.config.environment().to_string(),
        }),
    )
}
