//! Perplexity-backed extraction.

use async_trait::async_trait;
use perplexity_client::{ChatRequest, Message, PerplexityClient, PerplexityError};
use tracing::debug;

use super::ExtractionProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::pipeline::{parse::parse_attributes, prompts::build_prompt};
use crate::types::{attribute::Attribute, provider::ProviderIdentity, schema::SchemaChoice};

const PROVIDER: ProviderIdentity = ProviderIdentity::Perplexity;

/// Token cap for the credential probe.
const PROBE_MAX_TOKENS: u32 = 5;

/// Extraction through Perplexity chat completions.
#[derive(Clone)]
pub struct PerplexityProvider {
    client: PerplexityClient,
}

impl PerplexityProvider {
    pub fn new(client: PerplexityClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionProvider for PerplexityProvider {
    fn identity(&self) -> ProviderIdentity {
        PROVIDER
    }

    async fn extract(&self, link: &str, choice: &SchemaChoice) -> ProviderResult<Vec<Attribute>> {
        let prompt = build_prompt(link, choice);
        let request = ChatRequest::new(PROVIDER.model())
            .message(Message::system(prompt.system))
            .message(Message::user(prompt.user));

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(provider_error)?;

        let attributes = parse_attributes(&response.content)
            .map_err(|e| ProviderError::from_payload(PROVIDER, e))?;

        debug!(link = %link, count = attributes.len(), "Perplexity extraction parsed");
        Ok(attributes)
    }

    async fn probe(&self) -> ProviderResult<()> {
        let request = ChatRequest::new(PROVIDER.model())
            .message(Message::user("Hi"))
            .max_tokens(PROBE_MAX_TOKENS);

        match self.client.chat_completion(request).await {
            // A reachable, authorized endpoint is enough; the probe reply is irrelevant.
            Ok(_) | Err(PerplexityError::EmptyContent) => Ok(()),
            Err(e) => Err(provider_error(e)),
        }
    }
}

fn provider_error(err: PerplexityError) -> ProviderError {
    let unauthorized = err.is_unauthorized();
    match err {
        PerplexityError::Api { message, .. } if unauthorized => ProviderError::Unauthorized {
            provider: PROVIDER,
            message,
        },
        PerplexityError::Api { status, message } => ProviderError::Status {
            provider: PROVIDER,
            status,
            message,
        },
        PerplexityError::EmptyContent => ProviderError::EmptyContent { provider: PROVIDER },
        PerplexityError::Parse(reason) => ProviderError::MalformedJson {
            provider: PROVIDER,
            reason,
        },
        PerplexityError::Network(message) | PerplexityError::Config(message) => {
            ProviderError::Transport {
                provider: PROVIDER,
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_special_cased() {
        let err = provider_error(PerplexityError::Api {
            status: 401,
            message: "Invalid API key".into(),
        });
        assert!(matches!(err, ProviderError::Unauthorized { .. }));
        assert_eq!(
            err.to_string(),
            "Authentication failed. Please check your Perplexity API key."
        );
    }

    #[test]
    fn test_other_status_is_prefixed() {
        let err = provider_error(PerplexityError::Api {
            status: 500,
            message: "API returned status 500".into(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to fetch attributes from Perplexity: Perplexity API request failed with status 500."
        );
    }
}
