//! Error types for engine requests.

use thiserror::Error;

/// Result type alias for engine operations.
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors from talking to the engine.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The engine answered with a non-2xx status.
    #[error("Nexus Engine Error [{status}]: {body}")]
    EngineRequest {
        /// HTTP status code
        status: u16,
        /// Response body text, as sent by the engine
        body: String,
    },

    /// The engine answered 2xx but not with what the call expects.
    #[error("Invalid response from engine: {message}")]
    InvalidResponse { message: String },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON encoding or decoding error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SdkError {
    /// HTTP status of an engine error response.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::EngineRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}
