//! `POST /api/video-convert`

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use cemse_core::AppError;
use cemse_processing::{ConversionOutcome, TargetFormat, UploadArtifact};
use std::sync::Arc;

pub const CONVERSION_STATUS_HEADER: &str = "X-Conversion-Status";
pub const CONVERSION_ERROR_HEADER: &str = "X-Conversion-Error";

/// Longest diagnostic message placed in `X-Conversion-Error`.
const MAX_ERROR_HEADER_LEN: usize = 512;

/// Fields read from the multipart body.
struct ConvertForm {
    video: Option<UploadArtifact>,
    format: Option<String>,
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn convert_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let form = read_form(multipart?).await?;

    let upload = form
        .video
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HttpAppError(AppError::InvalidInput("No video file provided".to_string())))?;
    let target = TargetFormat::parse_lenient(form.format.as_deref());

    tracing::info!(
        filename = %upload.filename,
        content_type = ?upload.content_type,
        size = upload.len(),
        target = %target,
        "Video conversion requested"
    );

    let outcome = state.converter.convert(&upload, target).await?;

    if outcome.status.is_converted() {
        tracing::info!(
            status = %outcome.status,
            strategy = ?outcome.strategy,
            output_size = outcome.data.len(),
            "Video conversion finished"
        );
    } else {
        tracing::warn!(
            status = %outcome.status,
            strategy = ?outcome.strategy,
            error = outcome.error.as_deref().unwrap_or_default(),
            "Returning original upload unconverted"
        );
    }

    build_response(outcome)
}

async fn read_form(mut multipart: Multipart) -> Result<ConvertForm, HttpAppError> {
    let mut form = ConvertForm {
        video: None,
        format: None,
    };

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("video") => {
                let filename = field.file_name().unwrap_or("video").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data: Bytes = field.bytes().await?;
                form.video = Some(UploadArtifact::new(data, content_type, filename));
            }
            Some("format") => {
                form.format = Some(field.text().await?);
            }
            _ => {
                // Drain unknown fields so the stream can advance
                let _ = field.bytes().await?;
            }
        }
    }

    Ok(form)
}

fn build_response(outcome: ConversionOutcome) -> Result<Response, HttpAppError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, outcome.content_type.as_str())
        .header(header::CONTENT_LENGTH, outcome.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", outcome.filename),
        )
        .header(CONVERSION_STATUS_HEADER, outcome.status.as_str());

    if let Some(error) = outcome.error.as_deref() {
        if let Ok(value) = HeaderValue::from_str(&header_safe(error)) {
            builder = builder.header(CONVERSION_ERROR_HEADER, value);
        }
    }

    builder
        .body(Body::from(outcome.data))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}

/// Collapse a diagnostic message into a single printable ASCII header value.
fn header_safe(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { ' ' })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    cleaned.chars().take(MAX_ERROR_HEADER_LEN).collect()
}
