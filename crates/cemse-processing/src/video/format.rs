//! Target formats, conversion status tags and the upload artifact.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Output container requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Mp4,
    Webm,
}

impl TargetFormat {
    /// Parse the `format` form field. Anything unrecognised falls back to mp4.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("webm") => TargetFormat::Webm,
            _ => TargetFormat::Mp4,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Mp4 => "mp4",
            TargetFormat::Webm => "webm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Mp4 => "video/mp4",
            TargetFormat::Webm => "video/webm",
        }
    }

    /// Whether an upload with this declared type or extension is already in this container.
    pub fn matches_upload(&self, upload: &UploadArtifact) -> bool {
        let declared = upload
            .content_type
            .as_deref()
            .map(normalize_mime)
            .unwrap_or_default();
        if declared == self.mime_type() {
            return true;
        }

        upload.extension().as_deref() == Some(self.extension())
    }
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.extension())
    }
}

/// Which path a conversion request ended on. Sent back in `X-Conversion-Status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    ConvertedToMp4,
    ConvertedToWebm,
    FfmpegUnavailable,
    FallbackOriginalFile,
}

impl ConversionStatus {
    pub fn converted(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Mp4 => ConversionStatus::ConvertedToMp4,
            TargetFormat::Webm => ConversionStatus::ConvertedToWebm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStatus::ConvertedToMp4 => "converted-to-mp4",
            ConversionStatus::ConvertedToWebm => "converted-to-webm",
            ConversionStatus::FfmpegUnavailable => "ffmpeg-unavailable",
            ConversionStatus::FallbackOriginalFile => "fallback-original-file",
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(
            self,
            ConversionStatus::ConvertedToMp4 | ConversionStatus::ConvertedToWebm
        )
    }
}

impl Display for ConversionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An uploaded video held in memory for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub filename: String,
}

impl UploadArtifact {
    pub fn new(data: Bytes, content_type: Option<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            content_type,
            filename: filename.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lowercased extension of the original filename, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Header-safe filename with its extension replaced by the target's.
    pub fn renamed_for(&self, target: TargetFormat) -> String {
        let stem = Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let stem = sanitize_filename(stem);
        let stem = if stem.is_empty() { "video".to_string() } else { stem };
        format!("{}.{}", stem, target.extension())
    }

    /// Header-safe version of the original filename.
    pub fn safe_filename(&self, target: TargetFormat) -> String {
        let name = sanitize_filename(&self.filename);
        if name.is_empty() || name.starts_with('.') {
            self.renamed_for(target)
        } else {
            name
        }
    }

    /// Content type to use when handing the original bytes back.
    ///
    /// Keeps the declared type when it is a video type, otherwise uses the target's.
    pub fn passthrough_content_type(&self, target: TargetFormat) -> String {
        match self.content_type.as_deref().map(normalize_mime) {
            Some(ct) if ct.starts_with("video/") => ct,
            _ => target.mime_type().to_string(),
        }
    }
}

fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Keep only characters that are safe inside a quoted Content-Disposition filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
