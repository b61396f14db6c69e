//! Error types.
//!
//! Nothing in the game is fatal. [`GameError`] values are shown to the player
//! as transient notices; their `Display` text is the notice text.

use thiserror::Error;

use cylinder::{BulletType, ChamberError};

/// A player action the game refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The target slot holds an unfired bullet or is mid-load.
    #[error("This slot is already loaded.")]
    SlotLoaded(usize),

    /// No slot is free for a click-to-load.
    #[error("All slots are full.")]
    ChamberFull,

    /// The slot index does not exist.
    #[error("There is no slot {0}.")]
    InvalidSlot(usize),

    /// That palette bullet is already in the chamber.
    #[error("That bullet is already in the chamber.")]
    AlreadyLoaded(BulletType),

    /// Not one of the six palette ids.
    #[error("There is no palette bullet {0}.")]
    UnknownBullet(i64),

    /// The preset index does not exist.
    #[error("There is no preset {0}.")]
    InvalidPreset(usize),

    /// The preset has nothing to load.
    #[error("That preset is empty.")]
    EmptyPreset(usize),

    /// Bullet names must contain something other than whitespace.
    #[error("A bullet needs a name.")]
    BlankName,

    /// Bullet name over the character limit.
    #[error("Names are limited to {0} characters.")]
    NameTooLong(usize),

    /// Bullet message over the character limit.
    #[error("Messages are limited to {0} characters.")]
    MessageTooLong(usize),

    /// A name was submitted with no bullet waiting for one.
    #[error("No bullet is waiting for a name.")]
    NoPendingName,

    /// Custom colors are `#rrggbb`.
    #[error("'{0}' is not a color.")]
    InvalidColor(String),
}

impl From<ChamberError> for GameError {
    fn from(err: ChamberError) -> Self {
        match err {
            ChamberError::InvalidSlot(index) => Self::InvalidSlot(index),
            ChamberError::SlotOccupied(index) | ChamberError::SlotLoading(index) => {
                Self::SlotLoaded(index)
            }
            ChamberError::Full => Self::ChamberFull,
        }
    }
}

/// Failure of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("store value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Invalid game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document did not parse.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("configuration field `{field}` {reason}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
