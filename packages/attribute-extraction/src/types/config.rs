//! Endpoint configuration for the provider clients.

/// Base URLs for both providers. Override for proxies and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub gemini_base_url: String,
    pub perplexity_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            gemini_base_url: gemini_client::DEFAULT_BASE_URL.to_string(),
            perplexity_base_url: perplexity_client::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Point both providers at one server (typically a mock).
    pub fn single(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            gemini_base_url: base_url.clone(),
            perplexity_base_url: base_url,
        }
    }

    pub fn with_gemini(mut self, base_url: impl Into<String>) -> Self {
        self.gemini_base_url = base_url.into();
        self
    }

    pub fn with_perplexity(mut self, base_url: impl Into<String>) -> Self {
        self.perplexity_base_url = base_url.into();
        self
    }
}
