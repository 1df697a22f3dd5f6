//! Credential validation through a minimal provider call.

use tracing::{info, warn};

use crate::providers::ProviderFactory;
use crate::security::Credential;
use crate::types::provider::ProviderIdentity;

/// Message for a credential that is empty after trimming.
pub const EMPTY_KEY_MESSAGE: &str = "API key is empty.";

/// Result of checking a credential against its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Routed provider; `None` only when the key was empty
    pub provider: Option<ProviderIdentity>,
    pub error: Option<String>,
}

impl ValidationOutcome {
    fn valid(provider: ProviderIdentity) -> Self {
        Self {
            is_valid: true,
            provider: Some(provider),
            error: None,
        }
    }

    fn invalid(provider: Option<ProviderIdentity>, error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            provider,
            error: Some(error.into()),
        }
    }
}

/// Validate a credential.
///
/// An empty key is rejected without any network call. Otherwise the routed
/// provider receives one minimal completion request.
pub async fn validate(credential: &Credential, factory: &dyn ProviderFactory) -> ValidationOutcome {
    if credential.is_empty() {
        return ValidationOutcome::invalid(None, EMPTY_KEY_MESSAGE);
    }

    let provider = factory.provider_for(credential);
    let identity = provider.identity();

    match provider.probe().await {
        Ok(()) => {
            info!(provider = %identity, "API key validated");
            ValidationOutcome::valid(identity)
        }
        Err(e) => {
            warn!(provider = %identity, error = %e, "API key validation failed");
            ValidationOutcome::invalid(
                Some(identity),
                format!("{} validation failed: {}", identity, e.reason()),
            )
        }
    }
}
