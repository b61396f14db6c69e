//! Saved bullet names.
//!
//! Players can give each palette bullet a name and an on-fire message. Names
//! are keyed by bullet type, so every future instance of that color carries
//! them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cylinder::BulletType;

use crate::error::GameError;

/// Maximum name length in characters.
pub const NAME_LIMIT: usize = 32;
/// Maximum message length in characters.
pub const MESSAGE_LIMIT: usize = 160;
/// Name given to bullets loaded without one.
pub const DEFAULT_NAME: &str = "The Silent One";
/// Message given to bullets loaded without one.
pub const DEFAULT_MESSAGE: &str = "...";

/// A validated name and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletLabel {
    /// Bullet name.
    pub name: String,
    /// Message shown when the bullet fires.
    pub message: String,
}

impl BulletLabel {
    /// Validates a label.
    ///
    /// # Errors
    ///
    /// [`GameError::BlankName`] if the name is only whitespace,
    /// [`GameError::NameTooLong`] or [`GameError::MessageTooLong`] past the
    /// character limits.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Result<Self, GameError> {
        let name = name.into();
        let message = message.into();
        if name.trim().is_empty() {
            return Err(GameError::BlankName);
        }
        if name.chars().count() > NAME_LIMIT {
            return Err(GameError::NameTooLong(NAME_LIMIT));
        }
        if message.chars().count() > MESSAGE_LIMIT {
            return Err(GameError::MessageTooLong(MESSAGE_LIMIT));
        }
        Ok(Self { name, message })
    }
}

/// Names saved per bullet type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulletNames {
    labels: BTreeMap<BulletType, BulletLabel>,
}

impl BulletNames {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The label saved for `kind`.
    #[must_use]
    pub fn get(&self, kind: BulletType) -> Option<&BulletLabel> {
        self.labels.get(&kind)
    }

    /// Saves `label` for `kind`, replacing any previous one.
    pub fn set(&mut self, kind: BulletType, label: BulletLabel) {
        self.labels.insert(kind, label);
    }

    /// Forgets the label for `kind`. Returns true if there was one.
    pub fn remove(&mut self, kind: BulletType) -> bool {
        self.labels.remove(&kind).is_some()
    }

    /// True if no names are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of saved names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Saved labels in type order.
    pub fn iter(&self) -> impl Iterator<Item = (BulletType, &BulletLabel)> {
        self.labels.iter().map(|(kind, label)| (*kind, label))
    }
}
