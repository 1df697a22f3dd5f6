//! Error types for Perplexity client.

use thiserror::Error;

/// Result type for Perplexity client operations.
pub type Result<T> = std::result::Result<T, PerplexityError>;

/// Perplexity client errors.
#[derive(Debug, Error)]
pub enum PerplexityError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("Perplexity API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response envelope carried no message content
    #[error("No content returned from Perplexity API.")]
    EmptyContent,

    /// Parse error (invalid JSON envelope)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PerplexityError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the API rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
