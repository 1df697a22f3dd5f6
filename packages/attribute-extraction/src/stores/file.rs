//! JSON file key-value store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::KeyValueStore;
use crate::error::{StoreError, StoreResult};

/// Directory under the user's config directory holding the store.
pub const STORE_DIR: &str = "attribute-extractor";

/// File name of the store.
pub const STORE_FILE: &str = "store.json";

/// Store persisted as a flat JSON object of strings.
///
/// The file is read on every `get` and rewritten on every `set`; it holds a
/// single entry in practice.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/attribute-extractor/store.json`.
    pub fn in_config_dir() -> StoreResult<Self> {
        Ok(Self::new(default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Default store location.
pub fn default_path() -> StoreResult<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(STORE_DIR).join(STORE_FILE))
        .ok_or(StoreError::NoConfigDir)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;

        debug!(path = %self.path.display(), key = %key, "Store entry written");
        Ok(())
    }
}
