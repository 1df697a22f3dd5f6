//! Credential to provider routing.

use std::sync::Arc;

use reqwest::Client;

use super::{ExtractionProvider, GeminiProvider, PerplexityProvider, ProviderFactory};
use crate::security::Credential;
use crate::types::{config::ProviderEndpoints, provider::ProviderIdentity};

/// Prefix every Gemini API key starts with.
pub const GEMINI_KEY_PREFIX: &str = "AIza";

/// Decide which provider a credential belongs to.
///
/// Keys starting with `AIza` are Gemini keys; everything else is treated as a
/// Perplexity key. There is no failure case.
pub fn route(credential: &Credential) -> ProviderIdentity {
    if credential.expose().starts_with(GEMINI_KEY_PREFIX) {
        ProviderIdentity::Gemini
    } else {
        ProviderIdentity::Perplexity
    }
}

/// Factory producing the real HTTP providers.
///
/// All providers share one connection pool.
#[derive(Clone)]
pub struct HttpProviderFactory {
    http_client: Client,
    endpoints: ProviderEndpoints,
}

impl HttpProviderFactory {
    pub fn new(endpoints: ProviderEndpoints) -> Self {
        Self {
            http_client: Client::new(),
            endpoints,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }
}

impl Default for HttpProviderFactory {
    fn default() -> Self {
        Self::new(ProviderEndpoints::default())
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn provider_for(&self, credential: &Credential) -> Arc<dyn ExtractionProvider> {
        match route(credential) {
            ProviderIdentity::Gemini => Arc::new(GeminiProvider::new(
                gemini_client::GeminiClient::new(credential.expose())
                    .with_base_url(&self.endpoints.gemini_base_url)
                    .with_http_client(self.http_client.clone()),
            )),
            ProviderIdentity::Perplexity => Arc::new(PerplexityProvider::new(
                perplexity_client::PerplexityClient::new(credential.expose())
                    .with_base_url(&self.endpoints.perplexity_base_url)
                    .with_http_client(self.http_client.clone()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_by_prefix() {
        assert_eq!(route(&Credential::new("AIzaSyD-123")), ProviderIdentity::Gemini);
        assert_eq!(route(&Credential::new("  AIzaSyD-123  ")), ProviderIdentity::Gemini);
        assert_eq!(route(&Credential::new("pplx-123")), ProviderIdentity::Perplexity);
        assert_eq!(route(&Credential::new("aiza-lowercase")), ProviderIdentity::Perplexity);
        assert_eq!(route(&Credential::new("AIz")), ProviderIdentity::Perplexity);
        assert_eq!(route(&Credential::new("")), ProviderIdentity::Perplexity);
    }

    #[test]
    fn test_factory_builds_routed_provider() {
        let factory = HttpProviderFactory::default();

        let gemini = factory.provider_for(&Credential::new("AIzaSyD-123"));
        assert_eq!(gemini.identity(), ProviderIdentity::Gemini);

        let perplexity = factory.provider_for(&Credential::new("pplx-123"));
        assert_eq!(perplexity.identity(), ProviderIdentity::Perplexity);
    }
}
