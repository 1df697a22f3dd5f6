//! Testing utilities including mock implementations.
//!
//! These let applications exercise the session and pipeline without making
//! real provider calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ProviderError, ProviderResult};
use crate::providers::{route, ExtractionProvider, ProviderFactory};
use crate::security::Credential;
use crate::stores::KeyValueStore;
use crate::types::{attribute::Attribute, provider::ProviderIdentity, schema::SchemaChoice};

/// A mock provider with scripted per-link results.
///
/// Links without a script return an empty attribute list. Clones share
/// scripts and call history.
#[derive(Clone)]
pub struct MockProvider {
    identity: ProviderIdentity,

    /// Scripted results by link
    responses: Arc<RwLock<HashMap<String, ProviderResult<Vec<Attribute>>>>>,

    /// Error returned by `probe`, if any
    probe_error: Arc<RwLock<Option<ProviderError>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockProviderCall>>>,
}

/// Record of a call made to the mock provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockProviderCall {
    Extract {
        link: String,
        category: Option<String>,
    },
    Probe,
}

impl MockProvider {
    pub fn new(identity: ProviderIdentity) -> Self {
        Self {
            identity,
            responses: Arc::default(),
            probe_error: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Same scripts and history under another identity.
    pub fn with_identity(&self, identity: ProviderIdentity) -> Self {
        Self {
            identity,
            ..self.clone()
        }
    }

    /// Script a successful extraction for a link.
    pub fn with_attributes(self, link: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(link.into(), Ok(attributes));
        self
    }

    /// Script a failed extraction for a link.
    pub fn with_failure(self, link: impl Into<String>, error: ProviderError) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(link.into(), Err(error));
        self
    }

    /// Make every subsequent probe fail with `error`.
    pub fn fail_probe(&self, error: ProviderError) {
        *self.probe_error.write().unwrap() = Some(error);
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockProviderCall> {
        self.calls.read().unwrap().clone()
    }

    /// Links passed to `extract`, in call order.
    pub fn extracted_links(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockProviderCall::Extract { link, .. } => Some(link),
                MockProviderCall::Probe => None,
            })
            .collect()
    }

    pub fn probe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockProviderCall::Probe))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl ExtractionProvider for MockProvider {
    fn identity(&self) -> ProviderIdentity {
        self.identity
    }

    async fn extract(&self, link: &str, choice: &SchemaChoice) -> ProviderResult<Vec<Attribute>> {
        self.calls.write().unwrap().push(MockProviderCall::Extract {
            link: link.to_string(),
            category: choice.category().map(str::to_string),
        });

        self.responses
            .read()
            .unwrap()
            .get(link)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn probe(&self) -> ProviderResult<()> {
        self.calls.write().unwrap().push(MockProviderCall::Probe);

        match self.probe_error.read().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Factory handing out one shared [`MockProvider`], re-labelled with the
/// identity the credential routes to.
#[derive(Clone)]
pub struct MockProviderFactory {
    provider: MockProvider,
}

impl MockProviderFactory {
    pub fn new() -> Self {
        Self::with_provider(MockProvider::new(ProviderIdentity::Gemini))
    }

    pub fn with_provider(provider: MockProvider) -> Self {
        Self { provider }
    }

    /// The shared provider, for scripting and assertions.
    pub fn provider(&self) -> &MockProvider {
        &self.provider
    }
}

impl Default for MockProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFactory for MockProviderFactory {
    fn provider_for(&self, credential: &Credential) -> Arc<dyn ExtractionProvider> {
        Arc::new(self.provider.with_identity(route(credential)))
    }
}

/// Key-value store whose writes always fail.
#[derive(Debug, Default, Clone)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> crate::error::StoreResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> crate::error::StoreResult<()> {
        Err(crate::error::StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_scripts_and_tracks() {
        let provider = MockProvider::new(ProviderIdentity::Perplexity)
            .with_attributes("https://a", vec![Attribute::new("Color", "Red")]);

        let attrs = provider
            .extract("https://a", &SchemaChoice::Unconstrained)
            .await
            .unwrap();
        assert_eq!(attrs, vec![Attribute::new("Color", "Red")]);

        let unscripted = provider
            .extract("https://b", &SchemaChoice::Unconstrained)
            .await
            .unwrap();
        assert!(unscripted.is_empty());

        assert_eq!(provider.extracted_links(), vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_factory_relabels_identity() {
        let factory = MockProviderFactory::new();
        let provider = factory.provider_for(&Credential::new("pplx-1"));
        assert_eq!(provider.identity(), ProviderIdentity::Perplexity);
    }
}
