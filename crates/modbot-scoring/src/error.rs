//! Error types for classifier calls.

use std::time::Duration;

/// Result type alias for classifier calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifier error types.
///
/// None of these stop the bot; a failed call means "no score" for that
/// backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The service answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the service.
        message: String,
    },

    /// The text's language is not supported for a requested attribute.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The response parsed but lacked the expected fields.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The call did not finish in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Creates an API error from a status code and message.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
