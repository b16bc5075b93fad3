/*!
 * Error types for the captioneer application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with transcription provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The body arrived intact but matches no known transcript shape
    #[error(transparent)]
    Malformed(#[from] CaptionError),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The media payload is larger than the provider accepts
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected payload
        size: u64,
        /// Provider upload limit
        limit: u64,
    },

    /// Transient failures persisted through every retry
    #[error("Provider unavailable after {attempts} attempts: {message}")]
    ProviderUnavailable {
        /// Number of attempts made
        attempts: u32,
        /// Last error seen
        message: String,
    },
}

impl ProviderError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Map an HTTP error status and body to a provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the caption core (normalization, segmentation, export, editing)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptionError {
    /// The transcript produced no words
    #[error("Transcript contains no words")]
    EmptyTranscript,

    /// A cue would end at or before its start
    #[error("Invalid timing for cue {index}: start {start:.3}s, end {end:.3}s")]
    InvalidTiming {
        /// Index of the offending cue
        index: usize,
        /// Rejected start time in seconds
        start: f64,
        /// Rejected end time in seconds
        end: f64,
    },

    /// None of the recognized provider response shapes matched
    #[error("Malformed provider response: {0}")]
    MalformedProviderResponse(String),

    /// Export requested in a format other than SRT or WebVTT
    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    /// Cue index outside the current list
    #[error("Cue index {index} out of range (list has {len} cues)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current list length
        len: usize,
    },

    /// Subtitle text could not be parsed
    #[error("Subtitle parse error: {0}")]
    ParseError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the caption core
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
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
