//! HTTP error response body
//!
//! The IntoResponse implementation lives in the binary crate (cemse-api):
//! axum's trait cannot be implemented for cemse_core::AppError here.

use serde::Serialize;

/// JSON body returned for hard failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Underlying cause, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
