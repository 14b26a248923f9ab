//! FFmpegService - availability probe, transcoding with progress, metadata.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;

use super::command::FfmpegCommand;
use super::processor::{validate_executable, validate_path, VideoProcessor};
use super::progress::{is_progress_line, parse_progress_line, FfmpegProgress};
use crate::error::{MediaError, MediaResult};
use crate::metadata::MediaInfo;

/// Synthetic one-second source used to check that FFmpeg can actually encode.
const PROBE_SOURCE: &str = "testsrc=duration=1:size=320x240:rate=1";

/// Number of diagnostic stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Seam between the conversion pipeline and the FFmpeg binary.
#[async_trait]
pub trait Transcoder: Send + Sync + 'static {
    /// Check that FFmpeg can be launched and can encode, within `timeout`.
    async fn check_available(&self, timeout: Duration) -> MediaResult<()>;

    /// Run `command` to completion, publishing progress snapshots on `progress`.
    ///
    /// Dropping the returned future terminates the FFmpeg process.
    async fn transcode(
        &self,
        command: FfmpegCommand,
        progress: watch::Sender<FfmpegProgress>,
    ) -> MediaResult<()>;

    /// Summarise a media file. Diagnostic only.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;
}

pub struct FFmpegService {
    ffmpeg_path: String,
    video_processor: VideoProcessor,
}

impl FFmpegService {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> MediaResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_executable(&ffmpeg_path)?;
        let video_processor = VideoProcessor::new(ffprobe_path)?;

        Ok(Self {
            ffmpeg_path,
            video_processor,
        })
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }
}

#[async_trait]
impl Transcoder for FFmpegService {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "availability_probe"
    ))]
    async fn check_available(&self, timeout: Duration) -> MediaResult<()> {
        let run = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-f", "lavfi", "-i", PROBE_SOURCE, "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(MediaError::FfmpegUnavailable(format!(
                    "failed to launch {}: {}",
                    self.ffmpeg_path, e
                )))
            }
            Err(_) => {
                return Err(MediaError::FfmpegUnavailable(format!(
                    "probe did not finish within {}s",
                    timeout.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::FfmpegUnavailable(format!(
                "probe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, command, progress), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "transcode",
        input = %command.input().display(),
        output = %command.output().display()
    ))]
    async fn transcode(
        &self,
        command: FfmpegCommand,
        progress: watch::Sender<FfmpegProgress>,
    ) -> MediaResult<()> {
        validate_path(&command.input().to_string_lossy())?;
        validate_path(&command.output().to_string_lossy())?;

        let args = command.build_args();
        tracing::debug!(command = %format!("{} {}", self.ffmpeg_path, args.join(" ")), "Running FFmpeg");

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::Internal("FFmpeg stderr was not captured".to_string()))?;

        // Splits stderr into progress snapshots and a bounded tail of diagnostics
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut current = FfmpegProgress::default();
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = lines.next_line().await {
                if is_progress_line(&line) {
                    if let Some(snapshot) = parse_progress_line(&line, &mut current) {
                        progress.send_replace(snapshot);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let status = child.wait().await?;
        let stderr_tail = reader.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                format!("exit status {}", status),
                (!stderr_tail.is_empty()).then_some(stderr_tail),
                status.code(),
            ))
        }
    }

    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        self.video_processor.extract_media_info(path).await
    }
}
