//! Credential persistence.
//!
//! Available backends:
//! - `MemoryStore` - In-memory storage (tests, ephemeral sessions)
//! - `FileStore` - JSON file in the user's config directory

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreResult;
use crate::security::Credential;

/// Key the credential is stored under.
pub const CREDENTIAL_KEY: &str = "apiKey";

/// Minimal string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Read the stored credential, if any.
pub fn load_credential(store: &dyn KeyValueStore) -> StoreResult<Option<Credential>> {
    Ok(store.get(CREDENTIAL_KEY)?.map(Credential::new))
}

/// Persist a credential under [`CREDENTIAL_KEY`].
pub fn save_credential(store: &dyn KeyValueStore, credential: &Credential) -> StoreResult<()> {
    store.set(CREDENTIAL_KEY, credential.expose())
}
