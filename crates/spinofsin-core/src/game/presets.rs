//! Preset bank operations and cosmetic settings.

use super::{Game, GameState, Timer, TimerKey};
use crate::config::ms;
use crate::error::GameError;
use crate::event::GameEvent;
use crate::preset::{Generator, PalettePosition, Preset, PresetEntry};
use crate::profile;

impl Game {
    /// Saves the current chamber and cosmetics into bank `index`.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPreset`] if `index` is out of range.
    pub fn save_preset(&mut self, index: usize) -> Result<(), GameError> {
        let preset = Preset::capture(&self.chamber, &self.cosmetics);
        if let Err(err) = self.presets.save(index, preset) {
            return Err(self.reject(err));
        }
        profile::save_presets(self.store.as_mut(), &self.presets);
        self.events.push(GameEvent::PresetSaved { index });
        Ok(())
    }

    /// Empties bank `index`; a generator index generates again.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPreset`] if `index` is out of range.
    pub fn clear_preset(&mut self, index: usize) -> Result<(), GameError> {
        if let Err(err) = self.presets.clear(index) {
            return Err(self.reject(err));
        }
        profile::save_presets(self.store.as_mut(), &self.presets);
        self.events.push(GameEvent::PresetCleared { index });
        Ok(())
    }

    /// Loads bank `index`.
    ///
    /// The chamber clears and the rotation returns to 0 straight away; the
    /// content lands after a short delay with fresh bullet ids. Ignored while
    /// a spin, fire or reset is in flight.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPreset`] if `index` is out of range,
    /// [`GameError::EmptyPreset`] if there is nothing to load. The chamber is
    /// still cleared for an empty preset.
    pub fn load_preset(&mut self, index: usize) -> Result<(), GameError> {
        if self.resetting
            || self.firing
            || self.engine.is_spinning()
            || matches!(self.state, GameState::Spinning | GameState::Fired)
        {
            tracing::trace!("preset {} ignored in {}", index, self.state);
            return Ok(());
        }
        let empty = match self.presets.entry(index) {
            None => return Err(self.reject(GameError::InvalidPreset(index))),
            Some(entry) => entry == PresetEntry::Empty,
        };

        tracing::debug!("loading preset {}", index);
        self.cancel_preset_timers();
        self.pending_name = None;
        self.chamber.clear_all();
        self.engine.reset();
        self.set_state(GameState::Loading);
        self.events.push(GameEvent::PresetLoading { index });

        if empty {
            return Err(self.reject(GameError::EmptyPreset(index)));
        }
        self.timers.schedule_keyed(
            TimerKey::PresetApply,
            ms(self.config.preset_apply_ms),
            Timer::ApplyPreset { index },
        );
        Ok(())
    }

    /// Drops every step still owed to an earlier preset or quick load.
    fn cancel_preset_timers(&mut self) {
        for key in [
            TimerKey::PresetApply,
            TimerKey::GauntletCover,
            TimerKey::GauntletSpin,
            TimerKey::QuickLoadFill,
        ] {
            if let Some(timer) = self.timers.cancel_key(key) {
                tracing::debug!("cancelled {:?}", timer);
            }
        }
    }

    pub(super) fn apply_preset(&mut self, index: usize) {
        let (chamber, cosmetics, generator) = match self.presets.entry(index) {
            Some(PresetEntry::Procedural(generator)) => (
                generator.generate(self.random.as_mut(), &mut self.ids, &self.custom_color),
                None,
                Some(generator),
            ),
            Some(PresetEntry::Saved { preset, .. }) => (
                preset.rearm(&mut self.ids, &self.names),
                Some(preset.cosmetics()),
                None,
            ),
            Some(PresetEntry::Empty) | None => return,
        };

        self.chamber = chamber;
        if let Some(cosmetics) = cosmetics {
            self.cosmetics = cosmetics;
        }
        if generator == Some(Generator::Gauntlet) {
            self.timers.schedule_keyed(
                TimerKey::GauntletCover,
                ms(self.config.gauntlet_cover_ms),
                Timer::CoverAll,
            );
            self.timers.schedule_keyed(
                TimerKey::GauntletSpin,
                ms(self.config.gauntlet_spin_ms),
                Timer::GauntletSpin,
            );
        }
        let settled = self.settled_state();
        self.set_state(settled);
        self.events.push(GameEvent::PresetApplied { index });
    }

    pub(super) fn cover_all(&mut self) {
        self.chamber.cover_all();
        self.events.push(GameEvent::CoversClosed);
    }

    pub(super) fn gauntlet_spin(&mut self) {
        if self.spin_blocked() || self.engine.is_spinning() || self.engine.is_dragging() {
            return;
        }
        let velocity = self.config.gauntlet_velocity
            + self.random.unit() * self.config.gauntlet_velocity_jitter;
        if self.engine.apply_impulse(velocity) {
            self.start_spin(velocity, false);
        }
    }

    // ========================================================================
    // Cosmetics
    // ========================================================================

    /// Sets the chamber style name.
    pub fn set_chamber_style(&mut self, style: impl Into<String>) {
        self.cosmetics.chamber_style = style.into();
    }

    /// Moves the holster palette.
    pub fn set_palette_position(&mut self, x: f64, y: f64) {
        self.cosmetics.palette_position = PalettePosition { x, y };
    }

    /// Shows or hides the holster.
    pub fn set_holster_visible(&mut self, visible: bool) {
        self.cosmetics.holster_visible = visible;
    }

    /// Flips holster visibility.
    pub fn toggle_holster(&mut self) {
        self.cosmetics.holster_visible = !self.cosmetics.holster_visible;
    }

    /// Shows or hides the spin counter and remembers the choice.
    pub fn set_counter_visible(&mut self, visible: bool) {
        self.counter_visible = visible;
        profile::save_counter_visible(self.store.as_mut(), visible);
    }

    /// Turns bullet naming on or off.
    pub fn set_naming_enabled(&mut self, enabled: bool) {
        self.naming_enabled = enabled;
        if !enabled {
            self.dismiss_name();
        }
    }

    /// Shows or hides slot numbers.
    pub fn set_show_slot_numbers(&mut self, show: bool) {
        self.show_slot_numbers = show;
    }

    /// Sets the color of custom bullets loaded from now on.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidColor`] unless `color` is `#rrggbb`.
    pub fn set_custom_color(&mut self, color: &str) -> Result<(), GameError> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(self.reject(GameError::InvalidColor(color.to_string())));
        }
        self.custom_color = color.to_ascii_lowercase();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ms, GameConfig};
    use crate::game::{BulletChoice, Modifiers};
    use crate::preset::LUCKY_NAME;
    use cylinder::BulletType;

    fn game() -> Game {
        Game::with_seed(GameConfig::default(), 21)
    }

    mod bank_tests {
        use super::*;

        #[test]
        fn save_then_load_rearms() {
            let mut game = game();
            game.load(1, BulletChoice::Palette(6)).unwrap();
            game.load(4, BulletChoice::Dud).unwrap();
            game.run_for(ms(500), ms(16));
            game.click_slot(4, Modifiers::default()).unwrap();
            game.set_chamber_style("brass");
            game.save_preset(5).unwrap();
            let saved_id = game.chamber().slot(1).unwrap().bullet().unwrap().id();

            game.set_chamber_style("classic");
            game.load_preset(5).unwrap();
            assert!(game.chamber().is_empty());
            game.run_for(ms(100), ms(16));

            let slot = game.chamber().slot(1).unwrap();
            let bullet = slot.bullet().unwrap();
            assert_eq!(bullet.bullet_type(), BulletType::new(6));
            assert_ne!(bullet.id(), saved_id);
            assert!(game.chamber().slot(4).unwrap().is_hidden());
            assert_eq!(game.cosmetics().chamber_style, "brass");
            assert_eq!(game.state(), GameState::Ready);
            assert_eq!(game.rotation(), 0.0);
        }

        #[test]
        fn save_snapshot_is_independent() {
            let mut game = game();
            game.load(0, BulletChoice::Palette(1)).unwrap();
            game.run_for(ms(500), ms(16));
            game.save_preset(4).unwrap();
            game.fire();
            game.run_for(ms(1000), ms(16));

            let preset = game.presets().presets()[4].as_ref().unwrap();
            assert!(!preset.slots[0].is_spent);
        }

        #[test]
        fn empty_preset_clears_and_warns() {
            let mut game = game();
            game.load(0, BulletChoice::Palette(1)).unwrap();
            assert_eq!(game.load_preset(6), Err(GameError::EmptyPreset(6)));
            assert!(game.chamber().is_empty());
            assert_eq!(
                game.notice().map(|n| n.text.as_str()),
                Some("That preset is empty.")
            );
        }

        #[test]
        fn out_of_range_rejected() {
            let mut game = game();
            assert_eq!(game.save_preset(8), Err(GameError::InvalidPreset(8)));
            assert_eq!(game.load_preset(9), Err(GameError::InvalidPreset(9)));
        }

        #[test]
        fn ignored_while_spinning() {
            let mut game = game();
            game.load(0, BulletChoice::Palette(1)).unwrap();
            game.run_for(ms(500), ms(16));
            game.click_hub(Modifiers::default());
            game.load_preset(1).unwrap();
            assert!(!game.chamber().is_empty());
        }

        #[test]
        fn cleared_generator_index_generates_again() {
            let mut game = game();
            game.save_preset(2).unwrap();
            assert!(matches!(
                game.presets().entry(2),
                Some(PresetEntry::Saved { user_saved: true, .. })
            ));
            game.clear_preset(2).unwrap();
            assert_eq!(
                game.presets().entry(2),
                Some(PresetEntry::Procedural(Generator::LuckyDraw))
            );
        }
    }

    mod generator_tests {
        use super::*;

        #[test]
        fn lucky_draw_loads_hidden_pair() {
            let mut game = game();
            game.load_preset(2).unwrap();
            game.run_for(ms(100), ms(16));
            let slots = game.chamber().slots();
            assert_eq!(slots.iter().filter(|s| s.bullet().is_some()).count(), 2);
            assert!(slots
                .iter()
                .filter(|s| s.bullet().is_some())
                .all(|s| s.is_hidden()));
            let lucky = slots
                .iter()
                .filter_map(|s| s.bullet())
                .find(|b| b.is_custom())
                .unwrap();
            assert_eq!(lucky.name(), Some(LUCKY_NAME));
            assert_eq!(lucky.color(), game.custom_color());
        }

        #[test]
        fn gauntlet_covers_then_spins() {
            let mut game = game();
            game.load_preset(3).unwrap();
            game.run_for(ms(100), ms(16));
            assert_eq!(game.chamber().live_count(), 6);
            assert!(game.chamber().slots().iter().all(|s| !s.is_hidden()));

            game.run_for(ms(1650), ms(10));
            assert!(game.chamber().slots().iter().all(|s| s.is_hidden()));
            assert!(game.engine().is_spinning());
            assert_eq!(game.state(), GameState::Spinning);

            game.run_for(ms(20_000), ms(16));
            assert_eq!(game.state(), GameState::Ready);
            assert!(game.chamber().slots().iter().all(|s| !s.is_spent()));
        }

        #[test]
        fn next_preset_drops_gauntlet_steps() {
            let mut game = game();
            game.load_preset(3).unwrap();
            game.run_for(ms(200), ms(16));
            game.load_preset(1).unwrap();
            game.run_for(ms(1500), ms(16));

            assert!(game.chamber().slots().iter().all(|s| !s.is_hidden()));
            assert!(!game.engine().is_spinning());
            assert!(!game
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::CoversClosed)));
        }

        #[test]
        fn quick_reload_applies_latest_preset() {
            let mut game = game();
            game.load_preset(3).unwrap();
            game.load_preset(2).unwrap();
            game.run_for(ms(200), ms(16));
            let applied: Vec<usize> = game
                .events()
                .iter()
                .filter_map(|e| match e {
                    GameEvent::PresetApplied { index } => Some(*index),
                    _ => None,
                })
                .collect();
            assert_eq!(applied, vec![2]);
            assert_eq!(game.chamber().live_count(), 2);
        }

        #[test]
        fn twin_rounds_differ_between_loads() {
            let mut game = game();
            let mut layouts = std::collections::BTreeSet::new();
            for _ in 0..12 {
                game.load_preset(0).unwrap();
                game.run_for(ms(100), ms(16));
                let layout: Vec<i64> = game
                    .chamber()
                    .slots()
                    .iter()
                    .map(|s| s.bullet().map_or(0, |b| b.bullet_type().as_i64()))
                    .collect();
                assert_eq!(layout.iter().filter(|&&k| k != 0).count(), 2);
                layouts.insert(layout);
            }
            assert!(layouts.len() > 1);
        }
    }

    mod cosmetic_tests {
        use super::*;

        #[test]
        fn custom_color_validated() {
            let mut game = game();
            game.set_custom_color("#ABCDEF").unwrap();
            assert_eq!(game.custom_color(), "#abcdef");
            assert_eq!(
                game.set_custom_color("red"),
                Err(GameError::InvalidColor("red".into()))
            );
            assert_eq!(game.custom_color(), "#abcdef");
        }

        #[test]
        fn holster_toggles_from_background() {
            let mut game = game();
            assert!(game.cosmetics().holster_visible);
            game.click_background(Modifiers::alt());
            assert!(!game.cosmetics().holster_visible);
            game.click_background(Modifiers::default());
            assert!(!game.cosmetics().holster_visible);
        }
    }
}
