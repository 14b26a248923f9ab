//! Configuration module
//!
//! Configuration is read from the environment once at process start and then
//! shared read-only through application state.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 4000;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const MAX_VIDEO_SIZE_MB: usize = 500;
const FFMPEG_TIMEOUT_SECS: u64 = 300;
const FFMPEG_PROBE_TIMEOUT_SECS: u64 = 15;
const MIN_OUTPUT_SIZE_BYTES: u64 = 1024;
const MIN_JWT_SECRET_LEN: usize = 32;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Characters never allowed in a path handed to FFmpeg or ffprobe.
pub const DANGEROUS_PATH_CHARS: [char; 11] =
    [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub environment: String,
    pub http_concurrency_limit: usize,
}

/// FFmpeg and temporary file settings for the conversion pipeline
#[derive(Clone, Debug)]
pub struct VideoConversionConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Hard deadline for a single FFmpeg conversion. The process is killed when it elapses.
    pub ffmpeg_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub temp_dir: PathBuf,
    pub max_video_size_bytes: usize,
    pub min_output_size_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub video: VideoConversionConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn new(base: BaseConfig, video: VideoConversionConfig) -> Self {
        Config(Box::new(ServiceConfig { base, video }))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn video(&self) -> &VideoConversionConfig {
        &self.inner().video
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().video.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().video.ffprobe_path
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.inner().video.max_video_size_bytes
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn megabytes_to_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes.checked_mul(BYTES_PER_MB).ok_or_else(|| {
        anyhow::anyhow!(
            "MAX_VIDEO_SIZE_MB is too large: {} MB overflows the byte limit",
            megabytes
        )
    })
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
            http_concurrency_limit: parse_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                .max(1),
        };

        let temp_dir = env::var("VIDEO_TEMP_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let video = VideoConversionConfig {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_timeout_secs: parse_or("FFMPEG_TIMEOUT_SECS", FFMPEG_TIMEOUT_SECS),
            probe_timeout_secs: parse_or("FFMPEG_PROBE_TIMEOUT_SECS", FFMPEG_PROBE_TIMEOUT_SECS),
            temp_dir,
            max_video_size_bytes: megabytes_to_bytes(parse_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB))?,
            min_output_size_bytes: parse_or("MIN_OUTPUT_SIZE_BYTES", MIN_OUTPUT_SIZE_BYTES),
        };

        Ok(ServiceConfig { base, video })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if self.video.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH must not be empty"));
        }

        if self.video.ffmpeg_timeout_secs == 0 {
            return Err(anyhow::anyhow!("FFMPEG_TIMEOUT_SECS must be greater than 0"));
        }

        if self.video.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "FFMPEG_PROBE_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.video.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }

        // Same rules as the path check applied before each transcode
        let temp_dir = self.video.temp_dir.to_string_lossy();
        if temp_dir.chars().any(|c| DANGEROUS_PATH_CHARS.contains(&c))
            || temp_dir.contains("..")
        {
            return Err(anyhow::anyhow!(
                "VIDEO_TEMP_DIR contains characters not allowed in FFmpeg paths: {}",
                temp_dir
            ));
        }

        Ok(())
    }
}
