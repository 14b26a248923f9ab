//! Video conversion API integration tests.
//!
//! Run with: `cargo test -p cemse-api --test video_convert_test`

mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestResponse;
use helpers::auth::{expired_token, foreign_token, token_for};
use helpers::{setup_test_app, Script};

const CONVERT_PATH: &str = "/api/video-convert";

fn header<'a>(response: &'a TestResponse, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn video_form(bytes: impl Into<Bytes>, file_name: &str, mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes).file_name(file_name).mime_type(mime);
    MultipartForm::new().add_part("video", part)
}

#[tokio::test]
async fn test_convert_requires_authorization_header() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .multipart(video_form(&b"data"[..], "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert!(body["message"].is_string());
    assert!(app.transcoder.commands().is_empty());
}

#[tokio::test]
async fn test_convert_rejects_non_bearer_scheme() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .add_header("Authorization", "Basic dXNlcjpwYXNz")
        .multipart(video_form(&b"data"[..], "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_convert_rejects_expired_and_foreign_tokens() {
    let app = setup_test_app(Script::Write(4096));

    for token in [expired_token(), foreign_token(), "not-a-jwt".to_string()] {
        let response = app
            .client()
            .post(CONVERT_PATH)
            .authorization_bearer(token)
            .multipart(video_form(&b"data"[..], "clip.mp4", "video/mp4"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
    assert!(app.transcoder.commands().is_empty());
}

#[tokio::test]
async fn test_convert_without_video_field_is_bad_request() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(MultipartForm::new().add_text("format", "mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("No video file provided"));
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_with_empty_video_is_bad_request() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b""[..], "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.transcoder.commands().is_empty());
}

#[tokio::test]
async fn test_convert_non_multipart_body_is_bad_request() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .json(&serde_json::json!({ "video": "clip.mp4" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_convert_passes_through_when_ffmpeg_unavailable() {
    let app = setup_test_app(Script::Unavailable);
    let original: &'static [u8] = b"\x00\x00\x00\x14ftypqt  original quicktime bytes";

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(original, "clip.mov", "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), original);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("ffmpeg-unavailable")
    );
    assert_eq!(header(&response, "content-type"), Some("video/quicktime"));
    assert!(header(&response, "x-conversion-error").is_none());
    assert!(app.transcoder.commands().is_empty());
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_mov_reencodes_to_mp4() {
    let app = setup_test_app(Script::Write(4096));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b"quicktime"[..], "holiday clip.mov", "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().len(), 4096);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("converted-to-mp4")
    );
    assert_eq!(header(&response, "content-type"), Some("video/mp4"));
    assert_eq!(header(&response, "content-length"), Some("4096"));
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"holiday clip.mp4\"")
    );

    let commands = app.transcoder.commands();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains(&"libx264".to_string()));
    assert!(commands[0].contains(&"baseline".to_string()));
    assert!(commands[0].contains(&"+faststart".to_string()));
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_mp4_uses_stream_copy() {
    let app = setup_test_app(Script::Write(2048));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b"mp4 bytes"[..], "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("converted-to-mp4")
    );

    let commands = app.transcoder.commands();
    assert_eq!(commands.len(), 1);
    let args = &commands[0];
    let copy = args.iter().position(|a| a == "-c").expect("stream copy flag");
    assert_eq!(args[copy + 1], "copy");
    assert!(!args.contains(&"libx264".to_string()));
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_to_webm_target() {
    let app = setup_test_app(Script::Write(2048));

    let form = video_form(&b"quicktime"[..], "clip.mov", "video/quicktime").add_text("format", "WebM");
    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("converted-to-webm")
    );
    assert_eq!(header(&response, "content-type"), Some("video/webm"));
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"clip.webm\"")
    );

    let commands = app.transcoder.commands();
    assert!(commands[0].contains(&"libvpx-vp9".to_string()));
    assert!(commands[0].contains(&"libopus".to_string()));
}

#[tokio::test]
async fn test_convert_unknown_format_defaults_to_mp4() {
    let app = setup_test_app(Script::Write(2048));

    let form = video_form(&b"quicktime"[..], "clip.mov", "video/quicktime").add_text("format", "avi");
    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("converted-to-mp4")
    );
}

#[tokio::test]
async fn test_convert_falls_back_to_original_on_failure() {
    let app = setup_test_app(Script::Fail);
    let original: &'static [u8] = b"corrupted quicktime payload";

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(original, "broken.mov", "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), original);
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("fallback-original-file")
    );
    let error = header(&response, "x-conversion-error").expect("error header");
    assert!(error.contains("Invalid data found when processing input"));
    assert_eq!(
        header(&response, "content-disposition"),
        Some("attachment; filename=\"broken.mov\"")
    );
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_unreadable_original_is_server_error() {
    let app = setup_test_app(Script::DeleteInputAndFail);

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b"quicktime"[..], "clip.mov", "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert!(body["message"].is_string());
    let error = body["error"].as_str().unwrap_or_default();
    assert!(error.contains("Conversion failed: FFmpeg command failed: exit status: 1"));
    assert!(error.contains("fallback failed:"));
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_tiny_output_falls_back() {
    let app = setup_test_app(Script::Write(10));

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b"quicktime"[..], "clip.mov", "video/quicktime"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), b"quicktime");
    assert_eq!(
        header(&response, "x-conversion-status"),
        Some("fallback-original-file")
    );
    assert_eq!(app.leftover_temp_files(), 0);
}

#[tokio::test]
async fn test_convert_rejects_oversized_body() {
    let app = setup_test_app(Script::Write(2048));
    let oversized = vec![0u8; 4 * 1024 * 1024];

    let response = app
        .client()
        .post(CONVERT_PATH)
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(oversized, "big.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.transcoder.commands().is_empty());
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = setup_test_app(Script::Unavailable);

    let response = app
        .client()
        .post(CONVERT_PATH)
        .add_header("X-Request-ID", "req-abc-123")
        .authorization_bearer(token_for("user-1"))
        .multipart(video_form(&b"data"[..], "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(header(&response, "x-request-id"), Some("req-abc-123"));
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header(&response, "x-frame-options"), Some("DENY"));
}

#[tokio::test]
async fn test_health_reports_ffmpeg_available() {
    let app = setup_test_app(Script::Write(2048));

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ffmpeg"], "available");
}

#[tokio::test]
async fn test_health_degraded_without_ffmpeg() {
    let app = setup_test_app(Script::Unavailable);

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["ffmpeg"], "unavailable");
    assert!(!response.text().contains("os error"));
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app(Script::Unavailable);

    let response = app.client().get("/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
}
