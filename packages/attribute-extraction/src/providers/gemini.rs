//! Gemini-backed extraction.

use async_trait::async_trait;
use gemini_client::{schema::to_response_schema, GeminiClient, GeminiError, GenerateContentRequest};
use tracing::debug;

use super::ExtractionProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::pipeline::{parse::parse_attributes, prompts::build_prompt};
use crate::types::{attribute::Attribute, provider::ProviderIdentity, schema::SchemaChoice};

const PROVIDER: ProviderIdentity = ProviderIdentity::Gemini;

/// Extraction through Gemini `generateContent` with structured JSON output.
#[derive(Clone)]
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionProvider for GeminiProvider {
    fn identity(&self) -> ProviderIdentity {
        PROVIDER
    }

    async fn extract(&self, link: &str, choice: &SchemaChoice) -> ProviderResult<Vec<Attribute>> {
        let prompt = build_prompt(link, choice);
        let request = GenerateContentRequest::user(prompt.combined())
            .json_schema(to_response_schema(&prompt.response_constraint.schema));

        let response = self
            .client
            .generate_content(PROVIDER.model(), request)
            .await
            .map_err(provider_error)?;

        let attributes = parse_attributes(&response.text)
            .map_err(|e| ProviderError::from_payload(PROVIDER, e))?;

        debug!(link = %link, count = attributes.len(), "Gemini extraction parsed");
        Ok(attributes)
    }

    async fn probe(&self) -> ProviderResult<()> {
        match self
            .client
            .generate_content(PROVIDER.model(), GenerateContentRequest::user("Hi"))
            .await
        {
            // A reachable, authorized endpoint is enough; the probe reply is irrelevant.
            Ok(_) | Err(GeminiError::EmptyContent) => Ok(()),
            Err(e) => Err(provider_error(e)),
        }
    }
}

fn provider_error(err: GeminiError) -> ProviderError {
    match err {
        GeminiError::Api { status, message } => ProviderError::Status {
            provider: PROVIDER,
            status,
            message,
        },
        GeminiError::Blocked(reason) => ProviderError::Blocked {
            provider: PROVIDER,
            reason,
        },
        GeminiError::EmptyContent => ProviderError::EmptyContent { provider: PROVIDER },
        GeminiError::Parse(reason) => ProviderError::MalformedJson {
            provider: PROVIDER,
            reason,
        },
        GeminiError::Network(message) | GeminiError::Config(message) => {
            ProviderError::Transport {
                provider: PROVIDER,
                message,
            }
        }
    }
}
