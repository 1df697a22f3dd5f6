//! Provider identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two completion services an API key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderIdentity {
    /// Google Gemini (`generateContent`)
    Gemini,
    /// Perplexity (`chat/completions`)
    Perplexity,
}

impl ProviderIdentity {
    /// Model used for every call to this provider.
    pub fn model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Perplexity => "sonar-pro",
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("Gemini"),
            Self::Perplexity => f.write_str("Perplexity"),
        }
    }
}
