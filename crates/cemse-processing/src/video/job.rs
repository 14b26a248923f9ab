//! A running FFmpeg invocation: one awaitable completion, a progress side channel
//! and cancellation.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::command::FfmpegCommand;
use super::progress::FfmpegProgress;
use super::service::Transcoder;
use crate::error::{MediaError, MediaResult};

/// Handle to a transcode running on the tokio runtime.
///
/// Dropping the handle cancels the job, which terminates the FFmpeg process.
pub struct TranscodeJob {
    progress: watch::Receiver<FfmpegProgress>,
    cancel: CancellationToken,
    handle: JoinHandle<MediaResult<()>>,
    _cancel_on_drop: DropGuard,
}

impl TranscodeJob {
    pub fn spawn(transcoder: Arc<dyn Transcoder>, command: FfmpegCommand) -> Self {
        let (progress_tx, progress_rx) = watch::channel(FfmpegProgress::default());
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                result = transcoder.transcode(command, progress_tx) => result,
                _ = task_cancel.cancelled() => Err(MediaError::Cancelled),
            }
        });

        Self {
            progress: progress_rx,
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            handle,
        }
    }

    /// Subscribe to progress snapshots.
    pub fn progress(&self) -> watch::Receiver<FfmpegProgress> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for completion, cancelling the job if it outlives `timeout`.
    pub async fn wait(mut self, timeout: Duration) -> MediaResult<()> {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(joined) => joined
                .map_err(|e| MediaError::Internal(format!("Transcode task failed: {}", e)))?,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "FFmpeg timed out, killing process"
                );
                self.cancel.cancel();
                // The process is gone once the task has observed cancellation
                let _ = (&mut self.handle).await;
                Err(MediaError::Timeout(timeout.as_secs()))
            }
        }
    }
}
