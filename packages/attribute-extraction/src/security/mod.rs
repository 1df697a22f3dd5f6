//! Secret handling for API keys.

pub mod credentials;

pub use credentials::{Credential, SecretString};
