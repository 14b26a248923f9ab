//! CEMSE Core Library
//!
//! This crate provides the configuration and error types shared by the
//! CEMSE video conversion service components.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig, VideoConversionConfig, DANGEROUS_PATH_CHARS};
pub use error::{AppError, ErrorMetadata, LogLevel};
