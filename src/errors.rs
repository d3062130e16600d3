/*!
 * Error types for the podscript application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while turning one TTML document into a transcript.
///
/// All three abort the current document only. Output is written after the
/// whole transcript is assembled, so none of them leaves a partial file behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// The markup is not well-formed XML
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Well-formed markup without the required body/div structure
    #[error("TTML structure error: {0}")]
    Structure(String),

    /// The destination could not be written
    #[error("Failed to write transcript: {0}")]
    Sink(String),
}

impl TranscriptError {
    /// Short stable label used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Structure(_) => "structure",
            Self::Sink(_) => "sink",
        }
    }
}

impl From<quick_xml::Error> for TranscriptError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Errors that can occur when talking to the podcast catalog API
#[derive(Error, Debug)]
pub enum FetchError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The response did not have the expected shape
    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => Self::ApiError {
                status_code: status.as_u16(),
                message: error.to_string(),
            },
            None => Self::RequestFailed(error.to_string()),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from transcript extraction
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Error from the metadata database
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Error from the catalog API
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Short stable label used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Transcript(e) => e.kind(),
            Self::Database(_) => "database",
            Self::Fetch(_) => "fetch",
            Self::Unknown(_) => "unknown",
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
