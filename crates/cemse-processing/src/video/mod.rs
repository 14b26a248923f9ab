//! Video processing module

pub mod command;
pub mod converter;
pub mod format;
pub mod job;
pub mod processor;
pub mod progress;
pub mod service;
pub mod strategy;
pub mod temp;

pub use command::FfmpegCommand;
pub use converter::{ConversionError, ConversionOutcome, ConverterConfig, VideoConverter};
pub use format::{ConversionStatus, TargetFormat, UploadArtifact};
pub use job::TranscodeJob;
pub use processor::VideoProcessor;
pub use progress::FfmpegProgress;
pub use service::{FFmpegService, Transcoder};
pub use strategy::ConversionStrategy;
pub use temp::TempFilePair;
