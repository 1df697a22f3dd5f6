//! Provider capability and its two HTTP implementations.
//!
//! The pipeline only sees [`ExtractionProvider`]; which concrete provider
//! serves a credential is decided by [`router::route`].

pub mod gemini;
pub mod perplexity;
pub mod router;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::security::Credential;
use crate::types::{attribute::Attribute, provider::ProviderIdentity, schema::SchemaChoice};

pub use gemini::GeminiProvider;
pub use perplexity::PerplexityProvider;
pub use router::{route, HttpProviderFactory};

/// A completion service able to extract product attributes.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Which service this is.
    fn identity(&self) -> ProviderIdentity;

    /// Extract attributes for the product page at `link`.
    async fn extract(&self, link: &str, choice: &SchemaChoice) -> ProviderResult<Vec<Attribute>>;

    /// Minimal call proving the credential works.
    async fn probe(&self) -> ProviderResult<()>;
}

/// Builds the provider serving a credential.
pub trait ProviderFactory: Send + Sync {
    fn provider_for(&self, credential: &Credential) -> Arc<dyn ExtractionProvider>;
}
