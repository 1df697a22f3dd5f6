//! Pure Perplexity REST API client
//!
//! A minimal client for Perplexity's OpenAI-compatible chat completion API,
//! with no domain-specific logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use perplexity_client::{ChatRequest, Message, PerplexityClient};
//!
//! let client = PerplexityClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("sonar-pro")
//!         .message(Message::system("Answer tersely."))
//!         .message(Message::user("Hello!")),
//! ).await?;
//! println!("{}", response.content);
//! ```

pub mod error;
pub mod types;

pub use error::{PerplexityError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Pure Perplexity API client.
#[derive(Clone)]
pub struct PerplexityClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl PerplexityClient {
    /// Create a new Perplexity client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `PERPLEXITY_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .map_err(|_| PerplexityError::Config("PERPLEXITY_API_KEY not set".into()))?;
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

    /// Chat completion.
    ///
    /// Sends the conversation and returns the first choice's message content.
    /// A missing or empty content is reported as [`PerplexityError::EmptyContent`].
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Perplexity request failed");
                PerplexityError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Perplexity API error");
            return Err(PerplexityError::Api {
                status: status.as_u16(),
                message: api_error_message(&error_text, status.as_u16()),
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| PerplexityError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(PerplexityError::EmptyContent)?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Perplexity chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
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
