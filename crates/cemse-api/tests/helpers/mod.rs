//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p cemse-api --test video_convert_test`.
//! No FFmpeg binary is needed; conversions go through [`ScriptedTranscoder`].

#![allow(dead_code)]

pub mod auth;

use async_trait::async_trait;
use axum_test::TestServer;
use cemse_api::auth::JwtVerifier;
use cemse_api::setup::routes;
use cemse_api::state::AppState;
use cemse_core::{BaseConfig, Config, VideoConversionConfig};
use cemse_processing::{FfmpegCommand, FfmpegProgress, MediaError, MediaInfo, MediaResult, Transcoder};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

/// How the scripted transcoder responds.
#[derive(Clone, Copy, Debug)]
pub enum Script {
    /// Availability probe fails; nothing is transcoded.
    Unavailable,
    /// Writes this many bytes to the output path and succeeds.
    Write(usize),
    /// Exits non-zero with an FFmpeg-like stderr.
    Fail,
    /// Removes the materialised upload, then fails, so the original cannot be returned.
    DeleteInputAndFail,
}

/// Stand-in for FFmpeg that records every command it is asked to run.
pub struct ScriptedTranscoder {
    script: Script,
    commands: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTranscoder {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for ScriptedTranscoder {
    async fn check_available(&self, _timeout: Duration) -> MediaResult<()> {
        match self.script {
            Script::Unavailable => Err(MediaError::FfmpegUnavailable(
                "No such file or directory (os error 2)".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn transcode(
        &self,
        command: FfmpegCommand,
        progress: watch::Sender<FfmpegProgress>,
    ) -> MediaResult<()> {
        self.commands.lock().unwrap().push(command.build_args());

        match self.script {
            Script::Write(size) => {
                tokio::fs::write(command.output(), vec![0x42u8; size]).await?;
                progress.send_replace(FfmpegProgress {
                    frame: 30,
                    is_complete: true,
                    ..Default::default()
                });
                Ok(())
            }
            Script::Fail => Err(MediaError::ffmpeg_failed(
                "exit status: 1",
                Some("moov atom not found\ninput.mov: Invalid data found when processing input".to_string()),
                Some(1),
            )),
            Script::DeleteInputAndFail => {
                tokio::fs::remove_file(command.input()).await?;
                Err(MediaError::ffmpeg_failed("exit status: 1", None, Some(1)))
            }
            Script::Unavailable => Err(MediaError::FfmpegUnavailable("not installed".to_string())),
        }
    }

    async fn probe(&self, _path: &Path) -> MediaResult<MediaInfo> {
        Ok(MediaInfo::default())
    }
}

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub transcoder: Arc<ScriptedTranscoder>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files left behind in the conversion temp directory.
    pub fn leftover_temp_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("temp dir readable")
            .count()
    }
}

pub fn test_config(temp_dir: &Path) -> Config {
    Config::new(
        BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
            http_concurrency_limit: 64,
        },
        VideoConversionConfig {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_timeout_secs: 30,
            probe_timeout_secs: 5,
            temp_dir: temp_dir.to_path_buf(),
            max_video_size_bytes: 2 * 1024 * 1024,
            min_output_size_bytes: 1024,
        },
    )
}

/// Setup a test app whose transcoder follows `script`.
pub fn setup_test_app(script: Script) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());

    let transcoder = Arc::new(ScriptedTranscoder::new(script));
    let state = Arc::new(AppState::new(
        config.clone(),
        transcoder.clone(),
        Arc::new(JwtVerifier::new(config.jwt_secret())),
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        transcoder,
        temp_dir,
    }
}
