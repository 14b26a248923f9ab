//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::auth::JwtVerifier;
use crate::state::AppState;
use anyhow::{Context, Result};
use cemse_core::Config;
use cemse_processing::FFmpegService;
use std::sync::Arc;

const SERVICE_NAME: &str = "cemse-api";

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    cemse_infra::init_telemetry(SERVICE_NAME, config.environment(), config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    tokio::fs::create_dir_all(&config.video().temp_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create temp directory {}",
                config.video().temp_dir.display()
            )
        })?;

    let transcoder = FFmpegService::new(config.ffmpeg_path(), config.ffprobe_path())
        .context("Failed to initialize FFmpeg service: invalid FFMPEG_PATH or FFPROBE_PATH")?;
    let verifier = JwtVerifier::new(config.jwt_secret());

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(transcoder),
        Arc::new(verifier),
    ));

    match state.transcoder.check_available(state.probe_timeout()).await {
        Ok(()) => tracing::info!("FFmpeg available"),
        Err(e) => tracing::warn!(
            error = %e,
            "FFmpeg unavailable at startup; uploads will be returned unconverted"
        ),
    }

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
