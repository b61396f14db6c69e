//! Chamber slots and their lifecycle.
//!
//! A slot moves through `Empty → Loading → Loaded → Spent → Ejecting → Empty`.
//! `Loading` and `Ejecting` are transient: they exist only while the layer
//! above waits out an animation, and they are never persisted.
//!
//! # Invariants
//!
//! - `spent` implies a bullet is present
//! - no bullet implies `revealed`, `spent` and `hidden` are all false

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bullet::Bullet;

/// How quickly an ejected casing clears its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EjectSpeed {
    /// Alt-click eject.
    Fast,
    /// Regular eject of a spent casing, and every slot during a reset.
    Normal,
}

impl EjectSpeed {
    /// Time before the slot is considered empty again.
    #[must_use]
    pub const fn delay(self) -> Duration {
        match self {
            Self::Fast => Duration::from_millis(200),
            Self::Normal => Duration::from_millis(600),
        }
    }
}

/// Observable lifecycle phase of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPhase {
    /// No bullet, nothing in flight.
    Empty,
    /// A bullet is being inserted.
    Loading,
    /// Holds a bullet that has not been fired.
    Loaded,
    /// Holds a fired casing.
    Spent,
    /// The bullet is on its way out.
    Ejecting,
}

/// One of the six chamber positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    bullet: Option<Bullet>,
    #[serde(rename = "isRevealed")]
    revealed: bool,
    #[serde(rename = "isSpent")]
    spent: bool,
    #[serde(rename = "isHidden")]
    hidden: bool,
    #[serde(skip)]
    pending: Option<Bullet>,
    #[serde(skip)]
    ejecting: Option<EjectSpeed>,
}

impl Slot {
    /// Creates an empty slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a slot holding a fresh bullet.
    #[must_use]
    pub fn loaded(bullet: Bullet) -> Self {
        Self {
            bullet: Some(bullet),
            ..Self::default()
        }
    }

    /// Creates a slot from stored parts, repairing flags that contradict
    /// the slot invariants.
    #[must_use]
    pub fn from_parts(bullet: Option<Bullet>, revealed: bool, spent: bool, hidden: bool) -> Self {
        match bullet {
            Some(bullet) => Self {
                bullet: Some(bullet),
                revealed,
                spent,
                hidden: hidden && !spent,
                pending: None,
                ejecting: None,
            },
            None => Self::empty(),
        }
    }

    /// Returns a copy of this slot with its cover closed or open.
    ///
    /// Covers only apply to unfired bullets; on other slots this is a no-op.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        if self.is_live() {
            self.hidden = hidden;
        }
        self
    }

    /// The bullet in this slot, if any.
    #[must_use]
    pub fn bullet(&self) -> Option<&Bullet> {
        self.bullet.as_ref()
    }

    /// The bullet waiting to be inserted, if a load is in flight.
    #[must_use]
    pub fn pending(&self) -> Option<&Bullet> {
        self.pending.as_ref()
    }

    /// Cover removed by firing.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Has been fired.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.spent
    }

    /// Cover closed by the user.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Eject animation in flight, if any.
    #[must_use]
    pub const fn ejecting(&self) -> Option<EjectSpeed> {
        self.ejecting
    }

    /// True if a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// True if the slot holds an unfired bullet.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.bullet.is_some() && !self.spent
    }

    /// True if nothing occupies the slot and nothing is on its way in.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.bullet.is_none() && self.pending.is_none()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SlotPhase {
        if self.ejecting.is_some() {
            SlotPhase::Ejecting
        } else if self.pending.is_some() {
            SlotPhase::Loading
        } else if self.bullet.is_none() {
            SlotPhase::Empty
        } else if self.spent {
            SlotPhase::Spent
        } else {
            SlotPhase::Loaded
        }
    }

    pub(crate) fn set_pending(&mut self, bullet: Bullet) {
        self.pending = Some(bullet);
    }

    /// Moves the pending bullet into the slot. Loading over a spent casing
    /// replaces it and clears every flag.
    pub(crate) fn commit_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(bullet) => {
                *self = Self::loaded(bullet);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_ejecting(&mut self, speed: EjectSpeed) {
        self.ejecting = Some(speed);
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn mark_spent(&mut self) {
        self.revealed = true;
        self.spent = true;
        self.hidden = false;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::empty();
    }
}
