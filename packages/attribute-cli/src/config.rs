//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use attribute_extraction::{FileStore, ProviderEndpoints};
use dotenvy::dotenv;

/// Overrides the Gemini API base URL
pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";

/// Overrides the Perplexity API base URL
pub const PERPLEXITY_BASE_URL: &str = "PERPLEXITY_BASE_URL";

/// Overrides where the credential store lives
pub const STORE_PATH: &str = "ATTRX_STORE_PATH";

/// API key used when none is given on the command line
pub const API_KEY: &str = "ATTRX_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub endpoints: ProviderEndpoints,
    pub store_path: Option<PathBuf>,
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut endpoints = ProviderEndpoints::default();
        if let Some(url) = var(GEMINI_BASE_URL) {
            endpoints = endpoints.with_gemini(url);
        }
        if let Some(url) = var(PERPLEXITY_BASE_URL) {
            endpoints = endpoints.with_perplexity(url);
        }

        Self {
            endpoints,
            store_path: var(STORE_PATH).map(PathBuf::from),
            api_key: var(API_KEY),
        }
    }

    /// Credential store at the configured path, or in the user's config directory.
    pub fn store(&self) -> Result<FileStore> {
        match &self.store_path {
            Some(path) => Ok(FileStore::new(path)),
            None => FileStore::in_config_dir().context("Failed to locate the credential store"),
        }
    }
}
