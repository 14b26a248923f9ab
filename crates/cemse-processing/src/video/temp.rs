//! Per-request scratch files for the FFmpeg input and output.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::format::{TargetFormat, UploadArtifact};

/// Input and output paths for one conversion.
///
/// `cleanup` removes both files; if the pair is dropped first (e.g. the request
/// future was cancelled) the files are removed synchronously on drop.
#[derive(Debug)]
pub struct TempFilePair {
    input: PathBuf,
    output: PathBuf,
    cleaned: bool,
}

impl TempFilePair {
    pub fn new(dir: &Path, upload: &UploadArtifact, target: TargetFormat) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let token = uuid::Uuid::new_v4().simple().to_string();
        let token = &token[..12];

        let input_ext = upload
            .extension()
            .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "tmp".to_string());

        Self {
            input: dir.join(format!("video_input_{}_{}.{}", millis, token, input_ext)),
            output: dir.join(format!(
                "video_output_{}_{}.{}",
                millis,
                token,
                target.extension()
            )),
            cleaned: false,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub async fn write_input(&self, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(&self.input, data).await
    }

    /// Delete both files. Missing files are fine; other failures are logged.
    pub async fn cleanup(mut self) {
        for path in [&self.input, &self.output] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed temp file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file")
                }
            }
        }
        self.cleaned = true;
    }
}

impl Drop for TempFilePair {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        for path in [&self.input, &self.output] {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file on drop");
                }
            }
        }
    }
}
