use crate::auth::TokenVerifier;
use cemse_core::Config;
use cemse_processing::{ConverterConfig, Transcoder, VideoConverter};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// How long a health-check FFmpeg probe result is reused.
const FFMPEG_HEALTH_TTL_SECONDS: i64 = 10;

/// Cached availability probe result with expiration
#[derive(Clone, Copy)]
struct CachedAvailability {
    available: bool,
    expires_at: DateTime<Utc>,
}

/// FFmpeg availability as reported by `/health`, re-probed at most once per TTL.
pub struct FfmpegHealth {
    cache: RwLock<Option<CachedAvailability>>,
    ttl_seconds: i64,
}

impl FfmpegHealth {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            cache: RwLock::new(None),
            ttl_seconds,
        }
    }

    pub async fn is_available(&self, transcoder: &dyn Transcoder, timeout: Duration) -> bool {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = *cache {
                if cached.expires_at > Utc::now() {
                    return cached.available;
                }
            }
        }

        let available = match transcoder.check_available(timeout).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "FFmpeg health check failed");
                false
            }
        };

        let mut cache = self.cache.write().await;
        *cache = Some(CachedAvailability {
            available,
            expires_at: Utc::now() + chrono::Duration::seconds(self.ttl_seconds),
        });

        available
    }
}

/// Shared, read-only application state.
pub struct AppState {
    pub config: Config,
    pub converter: VideoConverter,
    pub transcoder: Arc<dyn Transcoder>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub ffmpeg_health: FfmpegHealth,
}

impl AppState {
    pub fn new(
        config: Config,
        transcoder: Arc<dyn Transcoder>,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let video = config.video();
        let converter = VideoConverter::new(
            transcoder.clone(),
            ConverterConfig {
                temp_dir: video.temp_dir.clone(),
                ffmpeg_timeout: Duration::from_secs(video.ffmpeg_timeout_secs),
                probe_timeout: Duration::from_secs(video.probe_timeout_secs),
                min_output_size_bytes: video.min_output_size_bytes,
            },
        );

        Self {
            config,
            converter,
            transcoder,
            token_verifier,
            ffmpeg_health: FfmpegHealth::new(FFMPEG_HEALTH_TTL_SECONDS),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.converter.config().probe_timeout
    }
}
