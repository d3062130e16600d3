/*!
 * Tests for error types
 */

use podscript::errors::{AppError, FetchError, TranscriptError};

#[test]
fn test_transcript_error_kind_shouldNameEachVariant() {
    assert_eq!(TranscriptError::Parse("x".into()).kind(), "parse");
    assert_eq!(TranscriptError::Structure("x".into()).kind(), "structure");
    assert_eq!(TranscriptError::Sink("x".into()).kind(), "sink");
}

#[test]
fn test_transcript_error_display_shouldIncludeMessage() {
    let error = TranscriptError::Structure("No body element found in TTML".into());

    assert_eq!(error.to_string(), "TTML structure error: No body element found in TTML");
}

#[test]
fn test_app_error_fromTranscriptError_shouldKeepKind() {
    let error: AppError = TranscriptError::Parse("bad".into()).into();

    assert_eq!(error.kind(), "parse");
    assert!(error.to_string().contains("XML parse error: bad"));
}

#[test]
fn test_app_error_fromIoError_shouldBeFileKind() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: AppError = io.into();

    assert_eq!(error.kind(), "file");
}

#[test]
fn test_app_error_fromAnyhow_shouldBeUnknownKind() {
    let error: AppError = anyhow::anyhow!("something").into();

    assert_eq!(error.kind(), "unknown");
    assert_eq!(error.to_string(), "Unknown error: something");
}

#[test]
fn test_fetch_error_api_error_shouldFormatStatus() {
    let error = FetchError::ApiError {
        status_code: 401,
        message: "unauthorized".into(),
    };

    assert_eq!(error.to_string(), "API responded with error: 401 - unauthorized");
    assert_eq!(AppError::from(error).kind(), "fetch");
}
