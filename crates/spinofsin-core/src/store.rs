//! Persisted key-value store collaborator.
//!
//! Values are JSON documents stored as strings under fixed keys. The game
//! treats the store as best effort: read failures fall back to defaults and
//! write failures are logged, never surfaced to the player.

use std::collections::BTreeMap;

use crate::error::StoreError;

/// Keys the game reads and writes.
pub mod keys {
    /// `8 × (null | Preset)`.
    pub const PRESETS: &str = "presets";
    /// `8 × bool`: which presets the player saved.
    pub const PRESET_CUSTOM: &str = "isPresetCustom";
    /// Lifetime spin count.
    pub const TOTAL_SPINS: &str = "totalSpins";
    /// Whether the spin counter is shown.
    pub const COUNTER_VISIBLE: &str = "counterVisible";
    /// Saved bullet names by type id. Absent when there are none.
    pub const BULLET_NAMES: &str = "bulletNames";
}

/// Opaque string store with get, set and remove.
pub trait KeyValueStore {
    /// Reads `key`. `Ok(None)` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        tracing::debug!("memory store: get {}", key);
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        tracing::debug!("memory store: set {} ({} bytes)", key, value.len());
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        tracing::debug!("memory store: remove {}", key);
        self.values.remove(key);
        Ok(())
    }
}

/// Shares one store between the game and an observer.
///
/// Handy for inspecting what the game persisted while it still owns its
/// store.
impl<S: KeyValueStore> KeyValueStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.borrow_mut().remove(key)
    }
}
