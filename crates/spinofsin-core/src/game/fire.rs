//! Firing and spin settling.
//!
//! Order is fixed: resolve the slot at the pin, uncover it if covered, wait,
//! detonate, settle.

use super::{Game, GameState, Timer, TimerKey};
use crate::audio::AudioCue;
use crate::config::ms;
use crate::event::{CasingSide, FireOutcome, GameEvent};
use crate::profile;

use cylinder::{resolve_active_slot, RestEvent};

impl Game {
    /// Pulls the trigger on the slot at the firing position.
    ///
    /// Returns false when the pull was dropped: during a spin or drag, a reset
    /// or another fire, or on a spent live casing.
    pub fn fire(&mut self) -> bool {
        if self.state == GameState::Spinning || self.engine.is_spinning() {
            tracing::trace!("fire ignored while spinning");
            return false;
        }
        if self.engine.is_dragging() {
            tracing::trace!("fire ignored mid-drag");
            return false;
        }
        self.fire_at(self.engine.rotation())
    }

    fn fire_at(&mut self, rotation: f64) -> bool {
        if self.resetting || self.firing || self.state == GameState::Fired {
            tracing::trace!("fire ignored: another action in flight");
            return false;
        }

        let slot = resolve_active_slot(rotation);
        let Some(target) = self.chamber.slot(slot) else {
            return false;
        };
        if target.is_spent() && target.bullet().is_some_and(|bullet| !bullet.is_dud()) {
            tracing::trace!("fire ignored: slot {} holds a spent casing", slot);
            return false;
        }

        self.firing = true;
        if target.is_hidden() {
            self.chamber.uncover(slot);
            self.events.push(GameEvent::Uncovered { slot });
            self.schedule(self.config.reveal_ms, Timer::Detonate { slot });
        } else {
            self.detonate(slot);
        }
        true
    }

    pub(super) fn detonate(&mut self, slot: usize) {
        self.set_state(GameState::Fired);

        let bullet = self.chamber.slot(slot).and_then(|s| s.bullet()).cloned();
        let outcome = match bullet {
            None => {
                self.play(AudioCue::DryFire);
                FireOutcome::DryFire
            }
            Some(bullet) => {
                self.chamber.mark_spent(slot);
                if self.naming_enabled {
                    if let (Some(name), Some(message)) = (bullet.name(), bullet.message()) {
                        if !message.is_empty() {
                            self.events.push(GameEvent::BulletRevealed {
                                name: name.to_string(),
                                message: message.to_string(),
                            });
                        }
                    }
                }
                let outcome = if bullet.is_dud() {
                    self.play(AudioCue::Thunk);
                    FireOutcome::Misfire
                } else {
                    self.play(AudioCue::Fire);
                    let casing = if self.random.coin() {
                        CasingSide::Left
                    } else {
                        CasingSide::Right
                    };
                    FireOutcome::Detonation { casing }
                };
                self.last_fired = Some(bullet);
                outcome
            }
        };

        tracing::debug!("fired slot {}: {:?}", slot, outcome);
        self.events.push(GameEvent::Fired { slot, outcome });
        self.schedule(self.config.fire_settle_ms, Timer::FireSettled);
    }

    pub(super) fn finish_fire(&mut self) {
        self.firing = false;
        let settled = self.settled_state();
        self.set_state(settled);
    }

    pub(super) fn on_rest(&mut self, rest: RestEvent) {
        self.play(AudioCue::SpinEnd);
        self.audio.set_spin_loop(false);
        self.spin_count = rest.spins;
        self.events.push(GameEvent::SpinStopped {
            rotation: rest.rotation,
            slot: rest.slot,
            spins: rest.spins,
        });
        self.schedule(
            self.config.rest_settle_ms,
            Timer::RestSettled {
                rotation: rest.rotation,
            },
        );
    }

    pub(super) fn finish_rest(&mut self, rotation: f64) {
        if self.spin_count > 0 {
            self.total_spins = self.total_spins.saturating_add(self.spin_count);
            profile::save_total_spins(self.store.as_mut(), self.total_spins);
        }

        if self.spin_intentional {
            self.spin_intentional = false;
            self.schedule(self.config.auto_fire_ms, Timer::AutoFire { rotation });
        } else {
            let settled = self.settled_state();
            self.set_state(settled);
        }

        self.timers.schedule_keyed(
            TimerKey::SpinCountClear,
            ms(self.config.spin_count_clear_ms),
            Timer::ClearSpinCount,
        );
    }

    pub(super) fn auto_fire(&mut self, rotation: f64) {
        if !self.fire_at(rotation) && !self.firing {
            let settled = self.settled_state();
            self.set_state(settled);
        }
    }

    pub(super) fn clear_spin_count(&mut self) {
        self.spin_count = 0;
        self.events.push(GameEvent::SpinCountCleared {
            total: self.total_spins,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{BulletChoice, Modifiers};
    use cylinder::EjectSpeed;

    fn loaded(choices: &[(usize, BulletChoice)]) -> Game {
        let mut game = Game::with_seed(GameConfig::default(), 5);
        for &(slot, choice) in choices {
            game.load(slot, choice).unwrap();
        }
        game.run_for(ms(600), ms(16));
        game.take_events();
        game
    }

    mod trigger_tests {
        use super::*;

        #[test]
        fn live_round_detonates_and_settles() {
            let mut game = loaded(&[(0, BulletChoice::Palette(1))]);
            assert!(game.fire());
            assert_eq!(game.state(), GameState::Fired);
            let slot = game.chamber().slot(0).unwrap();
            assert!(slot.is_spent() && slot.is_revealed());
            assert!(game.events().iter().any(|e| matches!(
                e,
                GameEvent::Fired {
                    slot: 0,
                    outcome: FireOutcome::Detonation { .. }
                }
            )));

            game.run_for(ms(1000), ms(16));
            assert_eq!(game.state(), GameState::Loading);
            assert!(!game.is_firing());
        }

        #[test]
        fn refire_during_settle_is_dropped() {
            let mut game = loaded(&[(0, BulletChoice::Dud), (1, BulletChoice::Palette(2))]);
            assert!(game.fire());
            assert!(!game.fire());
            game.run_for(ms(500), ms(16));
            assert!(!game.fire());
        }

        #[test]
        fn spent_casing_is_ignored() {
            let mut game = loaded(&[(0, BulletChoice::Palette(1)), (1, BulletChoice::Palette(2))]);
            assert!(game.fire());
            game.run_for(ms(1100), ms(16));
            assert_eq!(game.state(), GameState::Ready);
            game.take_events();

            assert!(!game.fire());
            assert!(game.events().is_empty());
            assert_eq!(game.state(), GameState::Ready);
        }

        #[test]
        fn spent_dud_misfires_again() {
            let mut game = loaded(&[(0, BulletChoice::Dud)]);
            assert!(game.fire());
            game.run_for(ms(1100), ms(16));
            assert!(game.fire());
            assert!(game.events().iter().any(|e| matches!(
                e,
                GameEvent::Fired {
                    outcome: FireOutcome::Misfire,
                    ..
                }
            )));
        }

        #[test]
        fn covered_round_uncovers_first() {
            let mut game = loaded(&[(0, BulletChoice::Palette(3))]);
            game.click_slot(0, Modifiers::default()).unwrap();
            assert!(game.chamber().slot(0).unwrap().is_hidden());

            assert!(game.fire());
            assert!(!game.chamber().slot(0).unwrap().is_hidden());
            assert!(!game.chamber().slot(0).unwrap().is_spent());
            assert_eq!(game.state(), GameState::Ready);

            game.run_for(ms(360), ms(16));
            assert!(game.chamber().slot(0).unwrap().is_spent());
            assert_eq!(game.state(), GameState::Fired);
        }

        #[test]
        fn slot_clicks_wait_for_the_fire() {
            let mut game = loaded(&[(0, BulletChoice::Palette(1))]);
            game.click_slot(0, Modifiers::default()).unwrap();
            assert!(game.fire());

            game.click_slot(0, Modifiers::alt()).unwrap();
            game.click_slot(0, Modifiers::default()).unwrap();
            game.eject(0, EjectSpeed::Normal).unwrap();
            let slot = game.chamber().slot(0).unwrap();
            assert_eq!(slot.ejecting(), None);
            assert!(!slot.is_hidden());

            game.run_for(ms(400), ms(16));
            assert!(game.events().iter().any(|e| matches!(
                e,
                GameEvent::Fired {
                    slot: 0,
                    outcome: FireOutcome::Detonation { .. }
                }
            )));

            // spent casing ejects once the fire has settled
            game.run_for(ms(1000), ms(16));
            game.click_slot(0, Modifiers::default()).unwrap();
            assert_eq!(
                game.chamber().slot(0).unwrap().ejecting(),
                Some(EjectSpeed::Normal)
            );
        }

        #[test]
        fn fire_dropped_mid_drag() {
            let mut game = loaded(&[(0, BulletChoice::Palette(1))]);
            assert!(game.begin_drag(0.0));
            game.drag(10.0);
            assert!(!game.fire());
            game.end_drag();
            assert!(!game
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::Fired { .. })));
        }
    }

    mod settle_tests {
        use super::*;

        fn spin_until_idle(game: &mut Game) {
            for _ in 0..5000 {
                game.tick(ms(16));
                if !game.engine().is_spinning() {
                    break;
                }
            }
        }

        #[test]
        fn intentional_spin_fires_where_it_lands() {
            let mut game = loaded(&[(0, BulletChoice::Palette(1))]);
            game.click_hub(Modifiers::default());
            spin_until_idle(&mut game);
            assert_eq!(game.state(), GameState::Spinning);

            game.run_for(ms(460), ms(10));
            assert!(game
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::Fired { .. })));
        }

        #[test]
        fn spin_count_adds_to_total_then_clears() {
            let mut game = loaded(&[]);
            game.click_hub(Modifiers::default());
            game.click_hub(Modifiers::default());
            game.click_hub(Modifiers::default());
            spin_until_idle(&mut game);
            let spins = game.spin_count();
            assert!(spins > 0);

            game.run_for(ms(2000), ms(16));
            assert_eq!(game.total_spins(), spins);
            assert_eq!(game.spin_count(), 0);
        }
    }
}
