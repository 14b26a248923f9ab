//! Video processor - ffprobe metadata extraction and path validation

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use cemse_core::DANGEROUS_PATH_CHARS;

use crate::error::{MediaError, MediaResult};
use crate::metadata::{MediaInfo, ProbeOutput};

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> MediaResult<()> {
    if path.chars().any(|c| DANGEROUS_PATH_CHARS.contains(&c)) {
        return Err(MediaError::SecurityViolation(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(MediaError::SecurityViolation(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Validate an executable path: no metacharacters and only plain path characters.
pub(crate) fn validate_executable(path: &str) -> MediaResult<()> {
    if path.trim().is_empty() {
        return Err(MediaError::SecurityViolation(
            "Executable path is empty".to_string(),
        ));
    }

    validate_path(path)?;

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':'))
    {
        return Err(MediaError::SecurityViolation(format!(
            "Executable path contains unsafe characters: {}",
            path
        )));
    }

    Ok(())
}

/// Validate and canonicalize a file path to prevent directory traversal
fn validate_and_canonicalize_path(path: &Path) -> MediaResult<PathBuf> {
    validate_path(&path.to_string_lossy())?;

    if !path.exists() {
        return Err(MediaError::InvalidOutput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    Ok(path.canonicalize()?)
}

pub struct VideoProcessor {
    ffprobe_path: String,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: impl Into<String>) -> MediaResult<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ffprobe_path
    }

    /// Extract container and stream summary from a file on disk.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn extract_media_info(&self, path: &Path) -> MediaResult<MediaInfo> {
        let start = std::time::Instant::now();
        let validated_path = validate_and_canonicalize_path(path)?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(&validated_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::FfprobeFailed {
                message: format!("exit status {}", output.status),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            });
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout)?;
        let info = MediaInfo::from(probe);

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = ?info.duration,
            width = ?info.width,
            height = ?info.height,
            video_codec = ?info.video_codec,
            audio_codec = ?info.audio_codec,
            "Video probe completed"
        );

        Ok(info)
    }
}
