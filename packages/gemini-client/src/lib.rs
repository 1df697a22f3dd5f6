//! Pure Gemini REST API client
//!
//! A minimal client for the Gemini `generateContent` endpoint with no
//! domain-specific logic. Supports plain text generation and structured JSON
//! output through `responseSchema`.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerateContentRequest};
//! use serde_json::json;
//!
//! let client = GeminiClient::from_env()?;
//!
//! let schema = gemini_client::schema::to_response_schema(&json!({
//!     "type": "array",
//!     "items": { "type": "string" }
//! }));
//!
//! let response = client
//!     .generate_content(
//!         "gemini-2.5-flash",
//!         GenerateContentRequest::user("List three colors").json_schema(schema),
//!     )
//!     .await?;
//! println!("{}", response.text);
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, tests, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reuse an existing HTTP client (shares its connection pool).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate content with the given model.
    ///
    /// Returns the concatenated text of the first candidate. A response with
    /// no candidate text is [`GeminiError::EmptyContent`], or
    /// [`GeminiError::Blocked`] when the prompt feedback names a block reason.
    pub async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: api_error_message(&error_text, status.as_u16()),
            });
        }

        let raw: types::GenerateContentResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = match raw.first_text() {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(match raw.prompt_feedback.and_then(|f| f.block_reason) {
                    Some(reason) => GeminiError::Blocked(reason),
                    None => GeminiError::EmptyContent,
                })
            }
        };

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generate content"
        );

        Ok(GenerateContentResponse {
            text,
            usage: raw.usage_metadata,
        })
    }
}

/// Pull `error.message` out of an error body, falling back to the status.
fn api_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<types::ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("API returned status {}", status))
}
