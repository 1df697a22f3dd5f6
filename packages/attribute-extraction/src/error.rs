//! Typed errors for the extraction library.
//!
//! Every error renders as a complete, human-readable sentence: the CLI and
//! the per-product `Error` state show `to_string()` verbatim.

use thiserror::Error;

use crate::types::provider::ProviderIdentity;

/// Session-level errors: input, credential, and export failures.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No credential has been entered and saved
    #[error("Please enter and save an API key before fetching attributes.")]
    MissingCredential,

    /// A credential is present but was not validated in this session
    #[error("Please validate your API key before fetching attributes.")]
    CredentialNotValidated,

    /// Fetch was requested with an empty selection
    #[error("Select at least one product to fetch.")]
    NothingSelected,

    /// Spreadsheet could not be turned into products
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    /// Schema file could not be used
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Credential store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// CSV export failure
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failure of a single provider call.
///
/// These never abort a batch; they end up as the `Error` state of the one
/// product they belong to.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Credential rejected (Perplexity reports this as HTTP 401)
    #[error("Authentication failed. Please check your {provider} API key.")]
    Unauthorized {
        provider: ProviderIdentity,
        message: String,
    },

    /// Non-2xx response
    #[error("Failed to fetch attributes from {provider}: {provider} API request failed with status {status}.")]
    Status {
        provider: ProviderIdentity,
        status: u16,
        message: String,
    },

    /// Connection, TLS, or timeout failure
    #[error("Failed to fetch attributes from {provider}: {message}")]
    Transport {
        provider: ProviderIdentity,
        message: String,
    },

    /// The provider refused the prompt (Gemini safety blocks)
    #[error("Failed to fetch attributes from {provider}: Prompt blocked by {provider}: {reason}")]
    Blocked {
        provider: ProviderIdentity,
        reason: String,
    },

    /// The response envelope carried no payload
    #[error("Failed to fetch attributes from {provider}: No content returned from {provider} API.")]
    EmptyContent { provider: ProviderIdentity },

    /// Payload text was not JSON
    #[error("Failed to fetch attributes from {provider}: {provider} API returned malformed JSON ({reason}).")]
    MalformedJson {
        provider: ProviderIdentity,
        reason: String,
    },

    /// Payload was JSON but not an array of `{attribute, value}` objects
    #[error("Failed to fetch attributes from {provider}: {provider} API returned data in an unexpected format.")]
    UnexpectedFormat { provider: ProviderIdentity },
}

impl ProviderError {
    /// Provider that produced this error.
    pub fn provider(&self) -> ProviderIdentity {
        match self {
            Self::Unauthorized { provider, .. }
            | Self::Status { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Blocked { provider, .. }
            | Self::EmptyContent { provider }
            | Self::MalformedJson { provider, .. }
            | Self::UnexpectedFormat { provider } => *provider,
        }
    }

    /// Underlying reason without the "Failed to fetch" framing.
    ///
    /// Used by credential validation, which reports the provider's own
    /// message rather than the extraction sentence.
    pub fn reason(&self) -> String {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Status { message, .. }
            | Self::Transport { message, .. } => message.clone(),
            Self::Blocked { provider, reason } => format!("Prompt blocked by {}: {}", provider, reason),
            Self::EmptyContent { provider } => format!("No content returned from {} API.", provider),
            Self::MalformedJson { reason, .. } => reason.clone(),
            Self::UnexpectedFormat { provider } => {
                format!("{} API returned data in an unexpected format.", provider)
            }
        }
    }

    /// Attach a provider to a provider-agnostic payload error.
    pub(crate) fn from_payload(provider: ProviderIdentity, err: PayloadError) -> Self {
        match err {
            PayloadError::Empty => Self::EmptyContent { provider },
            PayloadError::Malformed(reason) => Self::MalformedJson { provider, reason },
            PayloadError::UnexpectedFormat => Self::UnexpectedFormat { provider },
        }
    }
}

/// Provider-agnostic failure to turn payload text into attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("empty payload")]
    Empty,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("unexpected format")]
    UnexpectedFormat,
}

/// Spreadsheet input errors. The whole file is rejected.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Excel sheet is empty or has no data rows.")]
    Empty,

    #[error(
        "Invalid spreadsheet format. Could not find required column(s): {}. Please check the headers in your file. Headers found: [{}]",
        quote_list(.missing),
        quote_list(.found)
    )]
    MissingColumns {
        missing: Vec<&'static str>,
        found: Vec<String>,
    },

    #[error("No valid product rows with both a SKU and a Product Link could be found in the uploaded file.")]
    NoValidRows,

    #[error("Unsupported spreadsheet format '{0}'. Use a .csv or .xlsx file.")]
    UnsupportedFormat(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

fn quote_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Schema file errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema Error: {0}")]
    Parse(String),

    #[error("Schema Error: Schema must be a JSON object with categories as keys.")]
    NotAnObject,

    #[error("Schema Error: Schema JSON is empty or does not contain any categories.")]
    NoCategories,

    #[error("Schema Error: Category '{0}' is not defined in the schema.")]
    UnknownCategory(String),

    #[error("Schema Error: Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no configuration directory available for the credential store")]
    NoConfigDir,
}

/// CSV export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no processed products to export.")]
    NothingToExport,

    #[error("Failed to write CSV: {0}")]
    Write(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Write(err.to_string())
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for credential store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
