//! CEMSE media processing
//!
//! FFmpeg-backed video conversion: command building, progress tracking,
//! transcode jobs with deadlines, ffprobe metadata and the request-level
//! conversion pipeline with fallback to the original upload.

pub mod error;
pub mod metadata;
pub mod video;

pub use error::{MediaError, MediaResult};
pub use metadata::MediaInfo;
pub use video::{
    ConversionError, ConversionOutcome, ConversionStatus, ConversionStrategy, ConverterConfig,
    FFmpegService, FfmpegCommand, FfmpegProgress, TargetFormat, TranscodeJob, Transcoder,
    UploadArtifact, VideoConverter,
};
