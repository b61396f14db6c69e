//! Pointer and keyboard input.

use super::{BulletChoice, Game, GameState, Timer, TimerKey};
use crate::audio::AudioCue;
use crate::config::ms;
use crate::error::GameError;
use crate::event::GameEvent;

use cylinder::{DragRelease, EjectSpeed};

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Alt / Option.
    pub alt: bool,
    /// Ctrl / Cmd.
    pub ctrl: bool,
}

impl Modifiers {
    /// Alt held.
    #[must_use]
    pub const fn alt() -> Self {
        Self {
            alt: true,
            ctrl: false,
        }
    }

    /// Ctrl held.
    #[must_use]
    pub const fn ctrl() -> Self {
        Self {
            alt: false,
            ctrl: true,
        }
    }
}

/// Keys the game responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Fire.
    Space,
    /// Reset.
    R,
    /// Load the hovered holster bullet into slot `n - 1`.
    Digit(u8),
}

impl Key {
    /// Parses a key name such as `"space"`, `"r"` or `"3"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "space" | " " => Some(Self::Space),
            "r" => Some(Self::R),
            other => other.parse::<u8>().ok().map(Self::Digit),
        }
    }
}

impl Game {
    /// True when no new spin may start: a fire, a reset or a spin settle is
    /// in flight.
    pub(super) fn spin_blocked(&self) -> bool {
        self.resetting
            || self.firing
            || self.state == GameState::Fired
            || (self.state == GameState::Spinning && !self.engine.is_spinning())
    }

    /// Clicks the hub.
    ///
    /// A plain click spins with a random sign, or stacks onto a running spin.
    /// Ctrl switches infinite spin on. Any click during infinite spin lets
    /// the chamber decay and fire where it lands.
    pub fn click_hub(&mut self, modifiers: Modifiers) {
        if modifiers.alt {
            return;
        }

        if self.engine.is_infinite() {
            self.engine.stop_infinite();
            self.spin_intentional = true;
            self.events.push(GameEvent::InfiniteSpin { enabled: false });
            return;
        }

        if self.spin_blocked() {
            tracing::trace!("hub click ignored in {}", self.state);
            return;
        }

        if modifiers.ctrl {
            self.enable_infinite();
            return;
        }

        self.click_count = self.click_count.saturating_add(1);
        self.timers.schedule_keyed(
            TimerKey::ClickWindow,
            ms(self.config.click_window_ms),
            Timer::CloseClickWindow,
        );

        let magnitude = self
            .engine
            .config()
            .click_impulse(self.click_count, self.random.unit());

        if self.engine.is_spinning() {
            let sign = if self.engine.velocity() < 0.0 { -1.0 } else { 1.0 };
            self.engine.apply_impulse(magnitude * sign);
        } else if !self.engine.is_dragging() {
            let velocity = magnitude * self.random.sign();
            if self.engine.apply_impulse(velocity) {
                self.start_spin(velocity, true);
            }
        }
    }

    fn enable_infinite(&mut self) {
        let magnitude = self.config.infinite_velocity
            + self.random.unit() * self.config.infinite_velocity_jitter;
        let current = self.engine.velocity();
        let sign = if current == 0.0 {
            self.random.sign()
        } else {
            current.signum()
        };
        let velocity = magnitude * sign;
        if self.engine.start_infinite(velocity) {
            self.start_spin(velocity, false);
        } else {
            self.spin_intentional = false;
        }
        self.events.push(GameEvent::InfiniteSpin { enabled: true });
    }

    pub(super) fn start_spin(&mut self, velocity: f64, intentional: bool) {
        self.timers.cancel_key(TimerKey::SpinCountClear);
        self.spin_count = 0;
        self.spin_intentional = intentional;
        self.play(AudioCue::SpinStart);
        self.audio.set_spin_loop(true);
        self.set_state(GameState::Spinning);
        self.events.push(GameEvent::SpinStarted {
            velocity,
            intentional,
        });
    }

    /// Grabs the chamber with the pointer at `pointer_angle` degrees around
    /// the hub. Returns false if the chamber cannot be grabbed now.
    pub fn begin_drag(&mut self, pointer_angle: f64) -> bool {
        if self.spin_blocked() || self.engine.is_spinning() {
            return false;
        }
        self.engine.begin_drag(pointer_angle)
    }

    /// Moves the grabbed chamber to follow the pointer.
    pub fn drag(&mut self, pointer_angle: f64) {
        self.engine.drag_pointer(pointer_angle);
    }

    /// Lets go of the chamber. A fast release spins and fires where it lands.
    pub fn end_drag(&mut self) {
        match self.engine.end_drag() {
            Some(DragRelease::Fling { velocity }) => self.start_spin(velocity, true),
            Some(DragRelease::Settled { rotation }) => {
                self.play(AudioCue::SpinEnd);
                self.events.push(GameEvent::DragSettled { rotation });
            }
            None => {}
        }
    }

    /// Handles a key press. Ignored while a name prompt is open.
    ///
    /// # Errors
    ///
    /// Whatever the triggered load rejects with; the notice is already shown.
    pub fn key_press(&mut self, key: Key) -> Result<(), GameError> {
        if self.pending_name.is_some() {
            return Ok(());
        }
        match key {
            Key::Space => {
                self.fire();
            }
            Key::R => {
                self.reset();
            }
            Key::Digit(digit @ 1..=6) => {
                if let Some(choice) = self.hovered {
                    return self.load(usize::from(digit - 1), choice);
                }
            }
            Key::Digit(_) => {}
        }
        Ok(())
    }

    /// Sets the holster bullet under the pointer, for digit-key loads.
    pub fn set_hovered(&mut self, choice: Option<BulletChoice>) {
        self.hovered = choice;
    }

    /// Clicks a slot. Ignored while spinning, resetting or firing.
    ///
    /// Alt ejects a loaded slot fast and toggles slot numbers on an empty
    /// one. A spent casing ejects. Any other loaded slot flips its cover.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidSlot`] for an index past the chamber.
    pub fn click_slot(&mut self, slot: usize, modifiers: Modifiers) -> Result<(), GameError> {
        if self.engine.is_spinning() || self.resetting || self.fire_in_flight() {
            return Ok(());
        }
        let Some(target) = self.chamber.slot(slot) else {
            return Err(self.reject(GameError::InvalidSlot(slot)));
        };
        if target.ejecting().is_some() {
            return Ok(());
        }

        if target.bullet().is_none() {
            if modifiers.alt && !target.is_loading() {
                self.show_slot_numbers = !self.show_slot_numbers;
            }
            return Ok(());
        }

        if modifiers.alt {
            self.eject(slot, EjectSpeed::Fast)
        } else if target.is_spent() {
            self.eject(slot, EjectSpeed::Normal)
        } else {
            if let Some(hidden) = self.chamber.toggle_cover(slot) {
                self.play(AudioCue::Click);
                self.events.push(GameEvent::CoverToggled { slot, hidden });
            }
            Ok(())
        }
    }

    /// Alt-click on the chamber background: shows or hides the holster.
    pub fn click_background(&mut self, modifiers: Modifiers) {
        if modifiers.alt {
            self.toggle_holster();
        }
    }

    pub(super) fn on_motion(&mut self, slots_crossed: u32) {
        if slots_crossed > 0 {
            self.events.push(GameEvent::SlotsCrossed {
                count: slots_crossed,
            });
        }
        let spins = self.engine.spins();
        if spins != self.spin_count {
            self.spin_count = spins;
            self.events.push(GameEvent::SpinCounted { count: spins });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn game() -> Game {
        Game::with_seed(GameConfig::default(), 11)
    }

    mod key_tests {
        use super::*;

        #[test]
        fn parses_names() {
            assert_eq!(Key::from_name("Space"), Some(Key::Space));
            assert_eq!(Key::from_name("r"), Some(Key::R));
            assert_eq!(Key::from_name("4"), Some(Key::Digit(4)));
            assert_eq!(Key::from_name("x"), None);
        }

        #[test]
        fn digit_loads_hovered() {
            let mut game = game();
            game.key_press(Key::Digit(3)).unwrap();
            assert!(game.chamber().is_empty());

            game.set_hovered(Some(BulletChoice::Palette(4)));
            game.key_press(Key::Digit(3)).unwrap();
            assert!(game.chamber().slot(2).unwrap().is_loading());

            game.key_press(Key::Digit(9)).unwrap();
        }
    }

    mod hub_tests {
        use super::*;

        #[test]
        fn click_starts_intentional_spin() {
            let mut game = game();
            game.click_hub(Modifiers::default());
            assert_eq!(game.state(), GameState::Spinning);
            assert!(game.engine().is_spinning());
            let speed = game.engine().velocity().abs();
            assert!((15.0..25.0).contains(&speed));
        }

        #[test]
        fn second_click_stacks_same_sign() {
            let mut game = game();
            game.click_hub(Modifiers::default());
            let first = game.engine().velocity();
            game.click_hub(Modifiers::default());
            let second = game.engine().velocity();
            assert_eq!(first.signum(), second.signum());
            assert!(second.abs() >= first.abs() + 30.0);
        }

        #[test]
        fn alt_click_does_nothing() {
            let mut game = game();
            game.click_hub(Modifiers::alt());
            assert_eq!(game.state(), GameState::Loading);
            assert!(!game.engine().is_spinning());
        }

        #[test]
        fn ctrl_click_spins_forever() {
            let mut game = game();
            game.click_hub(Modifiers::ctrl());
            assert!(game.engine().is_infinite());
            let speed = game.engine().velocity().abs();
            assert!((60.0..80.0).contains(&speed));

            for _ in 0..500 {
                game.tick(ms(16));
            }
            assert!(game.engine().is_infinite());
            assert_eq!(game.engine().velocity().abs(), speed);

            game.click_hub(Modifiers::default());
            assert!(!game.engine().is_infinite());
            assert!(game.engine().is_spinning());
        }
    }

    mod drag_tests {
        use super::*;

        #[test]
        fn slow_drag_settles() {
            let mut game = game();
            assert!(game.begin_drag(0.0));
            for step in 1..=14 {
                game.drag(f64::from(step) * 3.0);
            }
            assert_eq!(game.rotation(), 42.0);
            game.end_drag();
            assert!(!game.engine().is_spinning());
            assert_eq!(game.rotation(), 60.0);
            assert!(game
                .events()
                .contains(&GameEvent::DragSettled { rotation: 60.0 }));
        }

        #[test]
        fn fling_spins() {
            let mut game = game();
            assert!(game.begin_drag(0.0));
            game.drag(20.0);
            game.end_drag();
            assert_eq!(game.state(), GameState::Spinning);
            assert_eq!(game.engine().velocity(), 20.0);
        }

        #[test]
        fn cannot_grab_spinning_chamber() {
            let mut game = game();
            game.click_hub(Modifiers::default());
            assert!(!game.begin_drag(0.0));
        }
    }

    mod slot_click_tests {
        use super::*;

        #[test]
        fn click_toggles_cover() {
            let mut game = game();
            game.load(1, BulletChoice::Palette(2)).unwrap();
            game.run_for(ms(600), ms(16));
            game.click_slot(1, Modifiers::default()).unwrap();
            assert!(game.chamber().slot(1).unwrap().is_hidden());
            game.click_slot(1, Modifiers::default()).unwrap();
            assert!(!game.chamber().slot(1).unwrap().is_hidden());
        }

        #[test]
        fn alt_click_ejects_fast() {
            let mut game = game();
            game.load(1, BulletChoice::Palette(2)).unwrap();
            game.run_for(ms(600), ms(16));
            game.click_slot(1, Modifiers::alt()).unwrap();
            assert_eq!(
                game.chamber().slot(1).unwrap().ejecting(),
                Some(EjectSpeed::Fast)
            );
            game.run_for(ms(250), ms(16));
            assert!(game.chamber().is_empty());
        }

        #[test]
        fn alt_click_empty_toggles_numbers() {
            let mut game = game();
            assert!(game.show_slot_numbers());
            game.click_slot(0, Modifiers::alt()).unwrap();
            assert!(!game.show_slot_numbers());
        }

        #[test]
        fn bad_index_is_rejected() {
            let mut game = game();
            assert_eq!(
                game.click_slot(6, Modifiers::default()),
                Err(GameError::InvalidSlot(6))
            );
            assert!(game.notice().is_some());
        }
    }
}
