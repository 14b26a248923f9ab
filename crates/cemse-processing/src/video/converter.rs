//! Request-level conversion pipeline: availability probe, materialisation,
//! transcode, output validation, fallback to the original upload and cleanup.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;

use super::format::{ConversionStatus, TargetFormat, UploadArtifact};
use super::job::TranscodeJob;
use super::progress::FfmpegProgress;
use super::service::Transcoder;
use super::strategy::ConversionStrategy;
use super::temp::TempFilePair;
use crate::error::{MediaError, MediaResult};

/// Failures the pipeline cannot recover from by returning the original upload.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to write upload to temporary file: {0}")]
    Materialize(#[source] std::io::Error),

    #[error("Conversion failed: {conversion}; fallback failed: {fallback}")]
    FallbackFailed { conversion: String, fallback: String },
}

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub temp_dir: PathBuf,
    pub ffmpeg_timeout: Duration,
    pub probe_timeout: Duration,
    pub min_output_size_bytes: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            ffmpeg_timeout: Duration::from_secs(300),
            probe_timeout: Duration::from_secs(15),
            min_output_size_bytes: 1024,
        }
    }
}

/// What to send back for one request.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub data: Bytes,
    pub status: ConversionStatus,
    pub content_type: String,
    pub filename: String,
    /// Why conversion failed, on the fallback path
    pub error: Option<String>,
    /// Set once a conversion was attempted
    pub strategy: Option<ConversionStrategy>,
}

impl ConversionOutcome {
    fn passthrough(
        upload: &UploadArtifact,
        data: Bytes,
        target: TargetFormat,
        status: ConversionStatus,
    ) -> Self {
        Self {
            data,
            status,
            content_type: upload.passthrough_content_type(target),
            filename: upload.safe_filename(target),
            error: None,
            strategy: None,
        }
    }
}

pub struct VideoConverter {
    transcoder: Arc<dyn Transcoder>,
    config: ConverterConfig,
}

impl VideoConverter {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: ConverterConfig) -> Self {
        Self { transcoder, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    #[tracing::instrument(skip(self, upload), fields(
        filename = %upload.filename,
        content_type = ?upload.content_type,
        size = upload.len(),
        target = %target
    ))]
    pub async fn convert(
        &self,
        upload: &UploadArtifact,
        target: TargetFormat,
    ) -> Result<ConversionOutcome, ConversionError> {
        if let Err(e) = self
            .transcoder
            .check_available(self.config.probe_timeout)
            .await
        {
            tracing::warn!(error = %e, "FFmpeg unavailable, returning original file");
            return Ok(ConversionOutcome::passthrough(
                upload,
                upload.data.clone(),
                target,
                ConversionStatus::FfmpegUnavailable,
            ));
        }

        let files = TempFilePair::new(&self.config.temp_dir, upload, target);
        if let Err(e) = files.write_input(&upload.data).await {
            tracing::error!(error = %e, path = %files.input().display(), "Failed to materialise upload");
            files.cleanup().await;
            return Err(ConversionError::Materialize(e));
        }

        let strategy = ConversionStrategy::select(upload, target);
        tracing::info!(strategy = %strategy, "Starting conversion");

        let outcome = match self.transcode(&files, strategy, target).await {
            Ok(data) => Ok(ConversionOutcome {
                data,
                status: ConversionStatus::converted(target),
                content_type: target.mime_type().to_string(),
                filename: upload.renamed_for(target),
                error: None,
                strategy: Some(strategy),
            }),
            Err(e) => {
                let message = e.summary();
                tracing::warn!(error = %message, strategy = %strategy, "Conversion failed, falling back to original file");
                match tokio::fs::read(files.input()).await {
                    Ok(original) => {
                        let mut outcome = ConversionOutcome::passthrough(
                            upload,
                            Bytes::from(original),
                            target,
                            ConversionStatus::FallbackOriginalFile,
                        );
                        outcome.error = Some(message);
                        outcome.strategy = Some(strategy);
                        Ok(outcome)
                    }
                    Err(read_err) => {
                        tracing::error!(error = %read_err, "Failed to read original file for fallback");
                        Err(ConversionError::FallbackFailed {
                            conversion: message,
                            fallback: read_err.to_string(),
                        })
                    }
                }
            }
        };

        files.cleanup().await;
        outcome
    }

    async fn transcode(
        &self,
        files: &TempFilePair,
        strategy: ConversionStrategy,
        target: TargetFormat,
    ) -> MediaResult<Bytes> {
        let started = Instant::now();
        let command = strategy.build_command(files.input(), files.output(), target);

        let job = TranscodeJob::spawn(self.transcoder.clone(), command);
        let logger = tokio::spawn(log_progress(job.progress()));
        let result = job.wait(self.config.ffmpeg_timeout).await;
        logger.abort();
        result?;

        let size = self.validate_output(files.output()).await?;
        tracing::info!(
            output_size = size,
            duration_ms = started.elapsed().as_millis(),
            "Conversion completed"
        );

        match self.transcoder.probe(files.output()).await {
            Ok(info) => tracing::debug!(
                duration = ?info.duration,
                video_streams = info.video_streams,
                audio_streams = info.audio_streams,
                format = ?info.format_name,
                "Output metadata"
            ),
            Err(e) => tracing::debug!(error = %e, "Output metadata probe failed"),
        }

        Ok(Bytes::from(tokio::fs::read(files.output()).await?))
    }

    async fn validate_output(&self, output: &Path) -> MediaResult<u64> {
        let metadata = match tokio::fs::metadata(output).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::InvalidOutput(
                    "Output file was not created".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        let size = metadata.len();
        if size == 0 {
            return Err(MediaError::InvalidOutput("Output file is empty".to_string()));
        }
        if size < self.config.min_output_size_bytes {
            return Err(MediaError::InvalidOutput(format!(
                "Output file too small: {} bytes (minimum {})",
                size, self.config.min_output_size_bytes
            )));
        }

        Ok(size)
    }
}

async fn log_progress(mut progress: watch::Receiver<FfmpegProgress>) {
    while progress.changed().await.is_ok() {
        let snapshot = progress.borrow_and_update().clone();
        tracing::debug!(
            frame = snapshot.frame,
            fps = snapshot.fps,
            out_time = %snapshot.out_time,
            speed = snapshot.speed,
            complete = snapshot.is_complete,
            "FFmpeg progress"
        );
    }
}
