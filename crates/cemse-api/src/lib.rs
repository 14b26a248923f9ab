//! CEMSE API Library
//!
//! HTTP handlers, authentication and application setup for the video
//! conversion service.

pub mod auth;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use handlers::video_convert::{CONVERSION_ERROR_HEADER, CONVERSION_STATUS_HEADER};
