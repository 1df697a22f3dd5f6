//! Product Attribute Extraction Library
//!
//! Reads a spreadsheet of products (SKU, part number, product link), asks a
//! completion service to extract attribute/value pairs from each product
//! page, and exports the results as CSV.
//!
//! Two services are supported. The API key decides which one is used: keys
//! starting with `AIza` go to Gemini, all others to Perplexity.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use attribute_extraction::{Credential, HttpProviderFactory, Session};
//!
//! let mut session = Session::new(Arc::new(HttpProviderFactory::default()));
//! session.load_spreadsheet("products.xlsx".as_ref())?;
//! session.set_credential(Credential::new(std::env::var("ATTRX_API_KEY")?));
//!
//! let outcome = session.validate_credential().await;
//! assert!(outcome.is_valid);
//!
//! session.select_all();
//! let report = session.fetch().await?;
//! println!("{} done, {} failed", report.succeeded, report.failed);
//!
//! session.write_csv("product_attributes.csv".as_ref())?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Products, attributes, schemas, provider identities
//! - [`ingest`] - CSV and XLSX spreadsheet reading
//! - [`providers`] - Provider capability, routing, Gemini and Perplexity
//! - [`pipeline`] - Prompts, payload parsing, validation, fan-out
//! - [`session`] - The multi-step flow state
//! - [`export`] - CSV export
//! - [`stores`] - Credential persistence
//! - [`security`] - Secret handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod providers;
pub mod security;
pub mod session;
pub mod stores;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ExportError, ExtractionError, PayloadError, ProviderError, Result, SchemaError,
    SpreadsheetError, StoreError,
};
pub use export::{to_csv, write_csv, DEFAULT_EXPORT_FILE};
pub use ingest::{load_products, parse_spreadsheet, SpreadsheetFormat};
pub use pipeline::{
    build_prompt, fetch_all, parse_attributes, validate, BatchReport, Outcome, Prompt,
    ValidationOutcome,
};
pub use providers::{
    route, ExtractionProvider, GeminiProvider, HttpProviderFactory, PerplexityProvider,
    ProviderFactory,
};
pub use security::{Credential, SecretString};
pub use session::Session;
pub use stores::{FileStore, KeyValueStore, MemoryStore, CREDENTIAL_KEY};
pub use types::{
    attribute::Attribute,
    config::ProviderEndpoints,
    product::{Product, ProductId, ProductState, ProductStatus},
    provider::ProviderIdentity,
    schema::{ExtractionSchema, SchemaChoice},
};
