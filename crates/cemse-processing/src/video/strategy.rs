//! Choosing between stream copy and re-encode, and the encoder profiles for each target.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use super::command::FfmpegCommand;
use super::format::{TargetFormat, UploadArtifact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStrategy {
    /// Remux without touching the encoded streams
    StreamCopy,
    /// Full decode and encode with the target's profile
    Reencode,
}

impl ConversionStrategy {
    /// Stream copy when the upload already declares or is named as the target container.
    pub fn select(upload: &UploadArtifact, target: TargetFormat) -> Self {
        if target.matches_upload(upload) {
            ConversionStrategy::StreamCopy
        } else {
            ConversionStrategy::Reencode
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStrategy::StreamCopy => "stream-copy",
            ConversionStrategy::Reencode => "re-encode",
        }
    }

    pub fn build_command(&self, input: &Path, output: &Path, target: TargetFormat) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(input, output);

        match (self, target) {
            (ConversionStrategy::StreamCopy, TargetFormat::Mp4) => {
                cmd.stream_copy().faststart().format("mp4")
            }
            (ConversionStrategy::StreamCopy, TargetFormat::Webm) => {
                cmd.stream_copy().format("webm")
            }
            // Baseline H.264 + AAC plays on every mobile browser
            (ConversionStrategy::Reencode, TargetFormat::Mp4) => cmd
                .video_codec("libx264")
                .profile("baseline", "3.0")
                .pixel_format("yuv420p")
                .preset("fast")
                .crf(23)
                .rate_limit("2M", "4M")
                .frame_rate(30)
                .audio_codec("aac")
                .audio_bitrate("128k")
                .audio_channels(2)
                .audio_sample_rate(44100)
                .faststart()
                .format("mp4"),
            (ConversionStrategy::Reencode, TargetFormat::Webm) => cmd
                .video_codec("libvpx-vp9")
                .video_bitrate("1M")
                .crf(32)
                .frame_rate(30)
                .pixel_format("yuv420p")
                .audio_codec("libopus")
                .audio_bitrate("128k")
                .audio_channels(2)
                .audio_sample_rate(48000)
                .format("webm"),
        }
    }
}

impl Display for ConversionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
