//! JSON file key-value store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use spinofsin_core::{KeyValueStore, StoreError};

/// Stores every key in one JSON object on disk.
///
/// Each write rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves half a file behind. A missing or unreadable file
/// starts empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!("could not read store {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };
        tracing::debug!("opened store {} with {} keys", path.display(), entries.len());
        Self { path, entries }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&self.entries)?)?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!("saved store to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
