//! The six-slot chamber.
//!
//! The chamber is a fixed ring of [`Slot`]s addressed by index. Loads and
//! ejects are two-phase: the first call validates and marks the slot, the
//! second (`commit_load` / `finish_eject`) completes the change once the
//! caller's animation delay has elapsed.
//!
//! # Example
//!
//! ```
//! use cylinder::{Bullet, BulletId, Chamber, ChamberError};
//!
//! let mut chamber = Chamber::new();
//! let first = Bullet::palette(BulletId::new(1), 1).unwrap();
//! let second = Bullet::palette(BulletId::new(2), 2).unwrap();
//!
//! chamber.load_bullet(0, first).unwrap();
//! assert_eq!(chamber.load_bullet(0, second), Err(ChamberError::SlotLoading(0)));
//!
//! chamber.commit_load(0);
//! assert!(chamber.has_live_rounds());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bullet::{Bullet, BulletType};
use crate::slot::{EjectSpeed, Slot};
use crate::NUM_SLOTS;

/// Reasons the chamber refuses a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChamberError {
    /// Index outside `0..NUM_SLOTS`.
    #[error("slot {0} does not exist")]
    InvalidSlot(usize),

    /// The slot holds a bullet that has not been fired.
    #[error("slot {0} is already loaded")]
    SlotOccupied(usize),

    /// A load into the slot is still in flight.
    #[error("slot {0} is still loading")]
    SlotLoading(usize),

    /// No slot can take another bullet.
    #[error("all slots are full")]
    Full,
}

/// Fixed ring of six slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chamber {
    slots: [Slot; NUM_SLOTS],
}

impl Chamber {
    /// Creates an empty chamber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chamber from explicit slots.
    #[must_use]
    pub fn from_slots(slots: [Slot; NUM_SLOTS]) -> Self {
        Self { slots }
    }

    /// All slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[Slot; NUM_SLOTS] {
        &self.slots
    }

    /// The slot at `index`, if it exists.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Slot, ChamberError> {
        self.slots
            .get_mut(index)
            .ok_or(ChamberError::InvalidSlot(index))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Starts loading `bullet` into `index`.
    ///
    /// Rejected if the slot holds an unfired bullet or a load is already in
    /// flight. A spent casing does not block the load: [`Chamber::commit_load`]
    /// replaces it and resets the slot's flags.
    ///
    /// # Errors
    ///
    /// Returns [`ChamberError::InvalidSlot`], [`ChamberError::SlotOccupied`]
    /// or [`ChamberError::SlotLoading`]. The slot is unchanged on error.
    pub fn load_bullet(&mut self, index: usize, bullet: Bullet) -> Result<(), ChamberError> {
        self.check_loadable(index)?;
        let slot = self.slot_mut(index)?;
        tracing::debug!("slot {} loading bullet {}", index, bullet.id());
        slot.set_pending(bullet);
        Ok(())
    }

    /// Checks whether [`Chamber::load_bullet`] would accept a bullet for
    /// `index`, without changing anything.
    ///
    /// # Errors
    ///
    /// Same as [`Chamber::load_bullet`].
    pub fn check_loadable(&self, index: usize) -> Result<(), ChamberError> {
        let slot = self.slot(index).ok_or(ChamberError::InvalidSlot(index))?;
        if slot.is_loading() {
            return Err(ChamberError::SlotLoading(index));
        }
        if slot.is_live() {
            return Err(ChamberError::SlotOccupied(index));
        }
        Ok(())
    }

    /// Completes a load started by [`Chamber::load_bullet`].
    ///
    /// Returns false if no load was in flight for the slot.
    pub fn commit_load(&mut self, index: usize) -> bool {
        self.slots
            .get_mut(index)
            .is_some_and(Slot::commit_pending)
    }

    /// Drops an in-flight load without touching the slot's contents.
    pub fn cancel_load(&mut self, index: usize) -> Option<Bullet> {
        let slot = self.slots.get_mut(index)?;
        let pending = slot.pending().cloned();
        if pending.is_some() {
            let mut restored = Slot::from_parts(
                slot.bullet().cloned(),
                slot.is_revealed(),
                slot.is_spent(),
                slot.is_hidden(),
            );
            if let Some(speed) = slot.ejecting() {
                restored.set_ejecting(speed);
            }
            *slot = restored;
        }
        pending
    }

    /// Starts ejecting the bullet in `index`.
    ///
    /// Returns the delay after which [`Chamber::finish_eject`] should be
    /// called, or `None` if the slot had no bullet.
    pub fn eject_bullet(&mut self, index: usize, speed: EjectSpeed) -> Option<std::time::Duration> {
        let slot = self.slots.get_mut(index)?;
        slot.bullet()?;
        slot.set_ejecting(speed);
        Some(speed.delay())
    }

    /// Clears a slot whose eject animation has finished.
    ///
    /// Returns false if the slot was not ejecting (for example because a
    /// reset already cleared it).
    pub fn finish_eject(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.ejecting().is_some() => {
                slot.clear();
                true
            }
            _ => false,
        }
    }

    /// Flips the cover of an unfired bullet. Returns the new cover state, or
    /// `None` if the slot has no unfired bullet.
    pub fn toggle_cover(&mut self, index: usize) -> Option<bool> {
        let slot = self.slots.get_mut(index)?;
        if !slot.is_live() {
            return None;
        }
        let hidden = !slot.is_hidden();
        slot.set_hidden(hidden);
        Some(hidden)
    }

    /// Opens the cover of a slot. Returns true if it was closed.
    pub fn uncover(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_hidden() => {
                slot.set_hidden(false);
                true
            }
            _ => false,
        }
    }

    /// Closes the cover of every unfired bullet.
    pub fn cover_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.is_live()) {
            slot.set_hidden(true);
        }
    }

    /// Marks the slot as fired. Idempotent; no-op on an empty slot.
    pub fn mark_spent(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.bullet().is_some() {
                slot.mark_spent();
            }
        }
    }

    /// First phase of a reset: every occupied slot starts ejecting.
    ///
    /// Returns the number of slots that started ejecting. Pending loads are
    /// dropped immediately.
    pub fn begin_reset(&mut self) -> usize {
        let mut ejecting = 0;
        for index in 0..NUM_SLOTS {
            self.cancel_load(index);
            if self.eject_bullet(index, EjectSpeed::Normal).is_some() {
                ejecting += 1;
            }
        }
        ejecting
    }

    /// Second phase of a reset: every slot returns to empty.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True if any slot holds an unfired bullet.
    #[must_use]
    pub fn has_live_rounds(&self) -> bool {
        self.slots.iter().any(Slot::is_live)
    }

    /// True if no slot holds or is receiving a bullet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Slot::is_free)
    }

    /// Lowest slot index with no bullet and no load in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ChamberError::Full`] if every slot is taken.
    pub fn first_free_slot(&self) -> Result<usize, ChamberError> {
        self.slots
            .iter()
            .position(Slot::is_free)
            .ok_or(ChamberError::Full)
    }

    /// Palette types present in the chamber, including in-flight loads and
    /// spent casings, in slot order without duplicates.
    #[must_use]
    pub fn loaded_types(&self) -> Vec<BulletType> {
        let mut types = Vec::new();
        for slot in &self.slots {
            for bullet in [slot.bullet(), slot.pending()].into_iter().flatten() {
                if bullet.is_palette() && !types.contains(&bullet.bullet_type()) {
                    types.push(bullet.bullet_type());
                }
            }
        }
        types
    }

    /// Number of slots holding an unfired bullet.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_live()).count()
    }
}
