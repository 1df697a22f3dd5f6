//! Error types for Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("Gemini API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The prompt was blocked before any candidate was produced
    #[error("Prompt blocked by Gemini: {0}")]
    Blocked(String),

    /// No candidate text in the response
    #[error("No content returned from Gemini API.")]
    EmptyContent,

    /// Parse error (invalid JSON envelope)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeminiError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
