//! Loading, naming, ejecting and resetting.

use serde::{Deserialize, Serialize};

use super::{Game, GameState, PendingName, Timer, TimerKey};
use crate::audio::AudioCue;
use crate::config::ms;
use crate::error::GameError;
use crate::event::GameEvent;
use crate::names::BulletLabel;
use crate::profile;

use cylinder::{Bullet, BulletType, Chamber, EjectSpeed, Slot, NUM_SLOTS, PALETTE};

/// Message carried by every quick-load bullet.
pub const FATE_MESSAGE: &str = "The odds are ever in your favor... or not.";

/// A bullet picked from the holster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulletChoice {
    /// Palette entry 1 to 6.
    Palette(i64),
    /// A blank.
    Dud,
    /// A live round in the custom color.
    Custom,
}

impl BulletChoice {
    /// Type identity of the bullet this choice mints.
    #[must_use]
    pub const fn bullet_type(self) -> BulletType {
        match self {
            Self::Palette(id) => BulletType::new(id),
            Self::Dud => BulletType::DUD,
            Self::Custom => BulletType::CUSTOM,
        }
    }
}

impl Game {
    /// Loads a holster bullet into `slot`.
    ///
    /// With naming on, a palette bullet with no saved name waits in
    /// [`Game::pending_name`] until [`Game::submit_name`]. Ignored during a
    /// reset or while a name prompt is open.
    ///
    /// # Errors
    ///
    /// The slot is loaded or mid-load, the index or palette id is unknown, or
    /// that palette bullet is already in the chamber. The notice is already
    /// shown.
    pub fn load(&mut self, slot: usize, choice: BulletChoice) -> Result<(), GameError> {
        if self.resetting || self.pending_name.is_some() {
            tracing::trace!("load into {} ignored", slot);
            return Ok(());
        }
        self.try_load(slot, choice).map_err(|err| self.reject(err))
    }

    fn try_load(&mut self, slot: usize, choice: BulletChoice) -> Result<(), GameError> {
        self.chamber.check_loadable(slot)?;
        let kind = choice.bullet_type();
        if let BulletChoice::Palette(id) = choice {
            if kind.palette_entry().is_none() {
                return Err(GameError::UnknownBullet(id));
            }
            if self.chamber.loaded_types().contains(&kind) {
                return Err(GameError::AlreadyLoaded(kind));
            }
        }

        let bullet = self.mint(choice)?;
        if !bullet.is_palette() {
            return self.start_load(slot, bullet);
        }

        match self.names.get(kind).cloned() {
            Some(label) => {
                let bullet = bullet.with_label(Some(label.name), Some(label.message));
                self.start_load(slot, bullet)
            }
            None if self.naming_enabled => {
                self.events.push(GameEvent::NameRequested { slot, kind });
                self.pending_name = Some(PendingName { slot, bullet });
                Ok(())
            }
            None => self.start_load(slot, bullet),
        }
    }

    fn mint(&mut self, choice: BulletChoice) -> Result<Bullet, GameError> {
        let id = self.ids.allocate();
        match choice {
            BulletChoice::Palette(kind) => {
                Bullet::palette(id, kind).ok_or(GameError::UnknownBullet(kind))
            }
            BulletChoice::Dud => Ok(Bullet::dud(id)),
            BulletChoice::Custom => Ok(Bullet::custom(id, self.custom_color.clone())),
        }
    }

    fn start_load(&mut self, slot: usize, bullet: Bullet) -> Result<(), GameError> {
        let (id, kind) = (bullet.id(), bullet.bullet_type());
        self.chamber.load_bullet(slot, bullet)?;
        self.play(AudioCue::Load);
        self.events.push(GameEvent::LoadStarted {
            slot,
            bullet: id,
            kind,
        });
        self.schedule(self.config.load_ms, Timer::CommitLoad { slot });
        Ok(())
    }

    pub(super) fn commit_load(&mut self, slot: usize) {
        if self.chamber.commit_load(slot) {
            self.events.push(GameEvent::Loaded { slot });
            if self.state == GameState::Loading {
                self.set_state(GameState::Ready);
            }
        }
    }

    /// Picks a holster bullet and loads it into the first free slot.
    ///
    /// # Errors
    ///
    /// [`GameError::ChamberFull`] when no slot is free, or anything
    /// [`Game::load`] rejects.
    pub fn click_to_load(&mut self, choice: BulletChoice) -> Result<(), GameError> {
        if self.resetting || self.pending_name.is_some() {
            return Ok(());
        }
        let slot = match self.chamber.first_free_slot() {
            Ok(slot) => slot,
            Err(err) => return Err(self.reject(err.into())),
        };
        self.play(AudioCue::Pickup);
        self.load(slot, choice)
    }

    // ========================================================================
    // Naming
    // ========================================================================

    /// Names the pending bullet, remembers the name for its type and loads
    /// it.
    ///
    /// # Errors
    ///
    /// [`GameError::NoPendingName`] with no prompt open, or a name or message
    /// [`BulletLabel::new`] rejects. A rejected name keeps the prompt open.
    pub fn submit_name(&mut self, name: &str, message: &str) -> Result<(), GameError> {
        let Some(pending) = self.pending_name.take() else {
            return Err(self.reject(GameError::NoPendingName));
        };
        let label = match BulletLabel::new(name, message) {
            Ok(label) => label,
            Err(err) => {
                self.pending_name = Some(pending);
                return Err(self.reject(err));
            }
        };

        let kind = pending.bullet.bullet_type();
        self.names.set(kind, label.clone());
        profile::save_names(self.store.as_mut(), &self.names);

        let bullet = pending
            .bullet
            .with_label(Some(label.name), Some(label.message));
        self.start_load(pending.slot, bullet)
            .map_err(|err| self.reject(err))
    }

    /// Closes the prompt, forgetting any saved name for the pending type.
    pub fn clear_name(&mut self) {
        if let Some(pending) = self.pending_name.take() {
            let cleared = self.names.remove(pending.bullet.bullet_type());
            if cleared {
                profile::save_names(self.store.as_mut(), &self.names);
            }
            self.events.push(GameEvent::NameDismissed { cleared });
        }
    }

    /// Closes the prompt without loading.
    pub fn dismiss_name(&mut self) {
        if self.pending_name.take().is_some() {
            self.events.push(GameEvent::NameDismissed { cleared: false });
        }
    }

    // ========================================================================
    // Ejecting and resetting
    // ========================================================================

    /// Ejects the bullet in `slot`; the slot empties after the eject delay.
    /// Ignored during a reset or while a fire is resolving.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidSlot`] for an index past the chamber.
    pub fn eject(&mut self, slot: usize, speed: EjectSpeed) -> Result<(), GameError> {
        if self.resetting || self.fire_in_flight() {
            return Ok(());
        }
        if slot >= NUM_SLOTS {
            return Err(self.reject(GameError::InvalidSlot(slot)));
        }
        if self.chamber.eject_bullet(slot, speed).is_some() {
            self.play(AudioCue::Click);
            self.events.push(GameEvent::EjectStarted {
                slot,
                fast: speed == EjectSpeed::Fast,
            });
            let delay = self.config.eject_delay(speed);
            self.timers.schedule(delay, Timer::FinishEject { slot });
        }
        Ok(())
    }

    pub(super) fn finish_eject(&mut self, slot: usize) {
        if self.chamber.finish_eject(slot) {
            self.events.push(GameEvent::Ejected { slot });
            if matches!(self.state, GameState::Ready | GameState::Loading) {
                let settled = self.settled_state();
                self.set_state(settled);
            }
        }
    }

    /// Stops everything and empties the chamber.
    ///
    /// The chamber halts at rotation 0, every pending step is cancelled and
    /// loaded slots play their eject. Spins and fires stay blocked until the
    /// reset finishes. Returns false if a reset was already running.
    pub fn reset(&mut self) -> bool {
        if self.resetting {
            return false;
        }
        tracing::debug!("reset");
        self.resetting = true;
        self.firing = false;
        self.spin_intentional = false;
        self.click_count = 0;
        self.pending_name = None;

        self.engine.reset();
        self.timers.bump_generation();
        if self.heat.cool() {
            self.events.push(GameEvent::SmokeStopped);
        }
        if self.spin_count > 0 {
            self.spin_count = 0;
            self.events.push(GameEvent::SpinCountCleared {
                total: self.total_spins,
            });
        }
        let ejecting = self.chamber.begin_reset();

        self.play(AudioCue::Reset);
        self.audio.set_spin_loop(false);
        self.set_state(GameState::Loading);
        self.events.push(GameEvent::ResetStarted);
        tracing::debug!("reset ejecting {} slots", ejecting);

        self.schedule(self.config.reset_ms, Timer::FinishReset);
        true
    }

    pub(super) fn finish_reset(&mut self) {
        self.chamber.clear_all();
        self.resetting = false;
        self.last_fired = None;
        self.events.push(GameEvent::ResetFinished);
    }

    /// Resets, then fills every slot with a named palette bullet.
    ///
    /// Returns false if a reset was already running.
    pub fn quick_load(&mut self) -> bool {
        if !self.reset() {
            return false;
        }
        self.timers.schedule_keyed(
            TimerKey::QuickLoadFill,
            ms(self.config.quick_load_ms),
            Timer::QuickLoadFill,
        );
        true
    }

    pub(super) fn fill_quick_load(&mut self) {
        let ids = &mut self.ids;
        let slots: [Slot; NUM_SLOTS] = std::array::from_fn(|index| {
            let Some(entry) = PALETTE.get(index) else {
                return Slot::empty();
            };
            Bullet::palette(ids.allocate(), entry.id.as_i64()).map_or_else(Slot::empty, |bullet| {
                Slot::loaded(bullet.with_label(
                    Some(format!("Fate #{}", index + 1)),
                    Some(FATE_MESSAGE.to_string()),
                ))
            })
        });
        self.chamber = Chamber::from_slots(slots);
        self.play(AudioCue::Load);
        self.set_state(GameState::Ready);
        self.events.push(GameEvent::QuickLoaded);
    }
}
