//! Persisted player profile.
//!
//! Reads are forgiving: a missing or damaged key falls back to its default
//! and damaged preset arrays are repaired element by element. Writes are
//! best effort and only log on failure.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use cylinder::BulletIdAllocator;

use crate::names::BulletNames;
use crate::preset::{Preset, PresetBank, PRESET_COUNT};
use crate::random::RandomSource;
use crate::store::{keys, KeyValueStore};

/// Everything the game keeps between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// The preset bank.
    pub presets: PresetBank,
    /// Lifetime spin count.
    pub total_spins: u64,
    /// Whether the spin counter is shown.
    pub counter_visible: bool,
    /// Saved bullet names.
    pub names: BulletNames,
}

impl Profile {
    /// Loads the profile from `store`.
    ///
    /// When no usable preset array is stored, the default bank is built with
    /// `rng` and `ids`. The returned flag is true when the stored presets
    /// were missing or needed repair, meaning they should be written back.
    pub fn load(
        store: &dyn KeyValueStore,
        rng: &mut dyn RandomSource,
        ids: &mut BulletIdAllocator,
    ) -> (Self, bool) {
        let total_spins = read_json::<u64>(store, keys::TOTAL_SPINS).unwrap_or(0);
        let counter_visible = read_json::<bool>(store, keys::COUNTER_VISIBLE).unwrap_or(true);
        let names = read_json::<BulletNames>(store, keys::BULLET_NAMES).unwrap_or_default();

        let (presets, rewrite) = match read_json::<Vec<Value>>(store, keys::PRESETS) {
            Some(stored) => {
                let user_saved = read_flags(store);
                let (presets, repaired) = decode_presets(stored);
                (PresetBank::from_stored(presets, &user_saved), repaired)
            }
            None => {
                tracing::debug!("no stored presets, using the default bank");
                (PresetBank::with_defaults(rng, ids), true)
            }
        };

        let profile = Self {
            presets,
            total_spins,
            counter_visible,
            names,
        };
        (profile, rewrite)
    }
}

fn decode_presets(stored: Vec<Value>) -> (Vec<Option<Preset>>, bool) {
    let mut repaired = stored.len() != PRESET_COUNT;
    if repaired {
        tracing::warn!(
            "stored preset array has {} entries, expected {}",
            stored.len(),
            PRESET_COUNT
        );
    }
    let presets = stored
        .into_iter()
        .take(PRESET_COUNT)
        .enumerate()
        .map(|(index, value)| {
            if value.is_null() {
                return None;
            }
            match serde_json::from_value::<Preset>(value) {
                Ok(preset) => Some(preset),
                Err(err) => {
                    tracing::warn!("dropping unreadable preset {}: {}", index, err);
                    repaired = true;
                    None
                }
            }
        })
        .collect();
    (presets, repaired)
}

fn read_flags(store: &dyn KeyValueStore) -> Vec<bool> {
    read_json::<Vec<Value>>(store, keys::PRESET_CUSTOM)
        .unwrap_or_default()
        .iter()
        .map(|flag| flag.as_bool().unwrap_or(false))
        .collect()
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let text = match store.get(key) {
        Ok(text) => text?,
        Err(err) => {
            tracing::warn!("could not read {}: {}", key, err);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("ignoring unreadable {}: {}", key, err);
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(Into::into)
        .and_then(|text| store.set(key, &text));
    if let Err(err) = result {
        tracing::warn!("could not write {}: {}", key, err);
    }
}

/// Writes both preset keys.
pub fn save_presets(store: &mut dyn KeyValueStore, bank: &PresetBank) {
    write_json(store, keys::PRESETS, bank.presets());
    write_json(store, keys::PRESET_CUSTOM, bank.user_saved());
}

/// Writes the lifetime spin count.
pub fn save_total_spins(store: &mut dyn KeyValueStore, total: u64) {
    write_json(store, keys::TOTAL_SPINS, &total);
}

/// Writes the counter visibility.
pub fn save_counter_visible(store: &mut dyn KeyValueStore, visible: bool) {
    write_json(store, keys::COUNTER_VISIBLE, &visible);
}

/// Writes the saved names, removing the key once none are left.
pub fn save_names(store: &mut dyn KeyValueStore, names: &BulletNames) {
    if names.is_empty() {
        if let Err(err) = store.remove(keys::BULLET_NAMES) {
            tracing::warn!("could not remove {}: {}", keys::BULLET_NAMES, err);
        }
    } else {
        write_json(store, keys::BULLET_NAMES, names);
    }
}
