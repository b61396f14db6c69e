//! Spin physics: impulses, friction, drag and rest detection.
//!
//! The engine owns the chamber's rotation (unbounded degrees) and its signed
//! angular velocity (degrees per tick). It advances one step per render
//! frame; wall-clock consumers (timers, heat) run one layer up on `dt`.
//!
//! A decaying spin ends with exactly one [`TickOutcome::Rest`]: velocity is
//! zeroed and rotation snapped to the nearest slot boundary, so the resolver
//! always sees an aligned chamber at rest.

use serde::{Deserialize, Serialize};

use crate::resolver::{angle_delta, resolve_active_slot, snap_to_slot};
use crate::{ANGLE_PER_SLOT, FLING_THRESHOLD, MIN_SPIN_VELOCITY, SPIN_FRICTION};

/// Tuning for the spin engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Per-tick velocity multiplier while a spin decays.
    pub friction: f64,
    /// Velocity magnitude below which a spin comes to rest.
    pub min_velocity: f64,
    /// Release velocity above which a drag turns into a spin.
    pub fling_threshold: f64,
    /// Impulse granted per click, before the click multiplier.
    pub base_impulse: f64,
    /// Upper bound of the random jitter added to each click impulse.
    pub impulse_jitter: f64,
    /// Cap on how many rapid clicks stack into one impulse.
    pub max_click_multiplier: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: SPIN_FRICTION,
            min_velocity: MIN_SPIN_VELOCITY,
            fling_threshold: FLING_THRESHOLD,
            base_impulse: 15.0,
            impulse_jitter: 10.0,
            max_click_multiplier: 3,
        }
    }
}

impl PhysicsConfig {
    /// Unsigned impulse for the `click_count`-th click of a gesture.
    ///
    /// `jitter` is a unit sample in `[0, 1)`.
    #[must_use]
    pub fn click_impulse(&self, click_count: u32, jitter: f64) -> f64 {
        let multiplier = click_count.clamp(1, self.max_click_multiplier.max(1));
        self.base_impulse * f64::from(multiplier) + jitter * self.impulse_jitter
    }
}

/// What the engine is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinPhase {
    /// At rest on a slot boundary.
    Idle,
    /// Following the pointer.
    Dragging,
    /// Decaying under friction.
    Spinning,
    /// Holding velocity constant until released.
    Infinite,
}

/// Emitted once when a decaying spin stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestEvent {
    /// Final, slot-aligned rotation.
    pub rotation: f64,
    /// Slot at the firing position.
    pub slot: usize,
    /// Full turns traversed during the spin.
    pub spins: u64,
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing moved.
    Idle,
    /// The chamber turned; `slots_crossed` slot boundaries passed under the
    /// firing pin this step.
    Moving {
        /// Boundaries crossed this step.
        slots_crossed: u32,
    },
    /// The spin ended this step.
    Rest(RestEvent),
}

/// Result of letting go of the chamber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// Released fast enough to spin.
    Fling {
        /// Initial spin velocity.
        velocity: f64,
    },
    /// Released slowly; snapped to the nearest slot without spinning.
    Settled {
        /// Slot-aligned rotation.
        rotation: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    last_angle: f64,
    pointer_travel: f64,
    start_rotation: f64,
}

/// The chamber's rotational state.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinEngine {
    config: PhysicsConfig,
    rotation: f64,
    velocity: f64,
    phase: SpinPhase,
    drag: Option<DragState>,
    /// Absolute rotation accumulated since the current spin started.
    travelled: f64,
}

impl Default for SpinEngine {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl SpinEngine {
    /// Creates an engine at rest at rotation 0.
    #[must_use]
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            rotation: 0.0,
            velocity: 0.0,
            phase: SpinPhase::Idle,
            drag: None,
            travelled: 0.0,
        }
    }

    /// Engine tuning.
    #[must_use]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Current rotation in degrees (unbounded).
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Current angular velocity in degrees per tick.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    /// True while the chamber spins on its own (decaying or infinite).
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning | SpinPhase::Infinite)
    }

    /// True while infinite spin holds the velocity.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.phase == SpinPhase::Infinite
    }

    /// True while following the pointer.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == SpinPhase::Dragging
    }

    /// Slot at the firing position, or `None` while spinning.
    #[must_use]
    pub fn active_slot(&self) -> Option<usize> {
        if self.is_spinning() {
            None
        } else {
            Some(resolve_active_slot(self.rotation))
        }
    }

    /// Full turns traversed since the current (or last) spin started.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn spins(&self) -> u64 {
        (self.travelled / 360.0).floor() as u64
    }

    // ========================================================================
    // Spinning
    // ========================================================================

    /// Adds `delta` to the velocity.
    ///
    /// From rest this starts a new spin and returns true. While spinning the
    /// impulse stacks onto the current velocity. Ignored while dragging.
    pub fn apply_impulse(&mut self, delta: f64) -> bool {
        match self.phase {
            SpinPhase::Dragging => false,
            SpinPhase::Spinning | SpinPhase::Infinite => {
                self.velocity += delta;
                false
            }
            SpinPhase::Idle => {
                if delta == 0.0 {
                    return false;
                }
                self.start_spin(delta, SpinPhase::Spinning);
                true
            }
        }
    }

    /// Switches infinite spin on with the given velocity. Returns true if
    /// this started a new spin from rest.
    pub fn start_infinite(&mut self, velocity: f64) -> bool {
        match self.phase {
            SpinPhase::Dragging => false,
            SpinPhase::Spinning | SpinPhase::Infinite => {
                self.velocity = velocity;
                self.phase = SpinPhase::Infinite;
                false
            }
            SpinPhase::Idle => {
                self.start_spin(velocity, SpinPhase::Infinite);
                true
            }
        }
    }

    /// Switches infinite spin off; the chamber decays from its current
    /// velocity. Returns true if infinite spin was on.
    pub fn stop_infinite(&mut self) -> bool {
        if self.phase == SpinPhase::Infinite {
            self.phase = SpinPhase::Spinning;
            true
        } else {
            false
        }
    }

    fn start_spin(&mut self, velocity: f64, phase: SpinPhase) {
        self.velocity = velocity;
        self.phase = phase;
        self.travelled = 0.0;
        tracing::debug!("spin started: velocity={:.2} phase={:?}", velocity, phase);
    }

    /// Advances the engine one frame.
    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            SpinPhase::Idle | SpinPhase::Dragging => TickOutcome::Idle,
            SpinPhase::Infinite => self.advance(self.velocity),
            SpinPhase::Spinning => {
                if self.velocity.abs() > self.config.min_velocity {
                    self.velocity *= self.config.friction;
                    self.advance(self.velocity)
                } else {
                    TickOutcome::Rest(self.come_to_rest())
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn advance(&mut self, delta: f64) -> TickOutcome {
        let before = (self.rotation / ANGLE_PER_SLOT).floor();
        self.rotation += delta;
        self.travelled += delta.abs();
        let after = (self.rotation / ANGLE_PER_SLOT).floor();
        TickOutcome::Moving {
            slots_crossed: (after - before).abs() as u32,
        }
    }

    fn come_to_rest(&mut self) -> RestEvent {
        self.velocity = 0.0;
        self.rotation = snap_to_slot(self.rotation);
        self.phase = SpinPhase::Idle;
        let rest = RestEvent {
            rotation: self.rotation,
            slot: resolve_active_slot(self.rotation),
            spins: self.spins(),
        };
        tracing::debug!(
            "spin at rest: rotation={} slot={} spins={}",
            rest.rotation,
            rest.slot,
            rest.spins
        );
        rest
    }

    /// Stops all motion where it is, without snapping.
    pub fn halt(&mut self) {
        self.velocity = 0.0;
        self.phase = SpinPhase::Idle;
        self.drag = None;
    }

    /// Returns to rotation 0 at rest.
    pub fn reset(&mut self) {
        self.halt();
        self.rotation = 0.0;
        self.travelled = 0.0;
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Grabs the chamber with the pointer at `pointer_angle` degrees.
    ///
    /// Rejected while the chamber spins.
    pub fn begin_drag(&mut self, pointer_angle: f64) -> bool {
        if self.is_spinning() {
            return false;
        }
        self.drag = Some(DragState {
            last_angle: pointer_angle,
            pointer_travel: 0.0,
            start_rotation: self.rotation,
        });
        self.velocity = 0.0;
        self.phase = SpinPhase::Dragging;
        true
    }

    /// Moves the chamber to `target` while dragging. The velocity becomes the
    /// difference from the previous sample.
    pub fn drag_to(&mut self, target: f64) {
        if self.phase != SpinPhase::Dragging {
            return;
        }
        self.velocity = target - self.rotation;
        self.rotation = target;
    }

    /// Follows the pointer to `pointer_angle` degrees.
    ///
    /// Pointer angles are unwrapped sample to sample, so crossing the
    /// `±180` seam does not jump the chamber a full turn.
    pub fn drag_pointer(&mut self, pointer_angle: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.pointer_travel += angle_delta(drag.last_angle, pointer_angle);
        drag.last_angle = pointer_angle;
        let target = drag.start_rotation + drag.pointer_travel;
        self.drag_to(target);
    }

    /// Lets go of the chamber. Returns `None` if no drag was in progress.
    pub fn end_drag(&mut self) -> Option<DragRelease> {
        if self.phase != SpinPhase::Dragging {
            return None;
        }
        self.drag = None;
        if self.velocity.abs() > self.config.fling_threshold {
            let velocity = self.velocity;
            self.start_spin(velocity, SpinPhase::Spinning);
            Some(DragRelease::Fling { velocity })
        } else {
            self.velocity = 0.0;
            self.rotation = snap_to_slot(self.rotation);
            self.phase = SpinPhase::Idle;
            Some(DragRelease::Settled {
                rotation: self.rotation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_to_rest(engine: &mut SpinEngine) -> RestEvent {
        for _ in 0..100_000 {
            if let TickOutcome::Rest(rest) = engine.tick() {
                return rest;
            }
        }
        panic!("spin never came to rest");
    }

    mod impulse_tests {
        use super::*;

        #[test]
        fn impulse_from_rest_starts_spin() {
            let mut engine = SpinEngine::default();
            assert!(engine.apply_impulse(20.0));
            assert!(engine.is_spinning());
            assert_eq!(engine.active_slot(), None);
        }

        #[test]
        fn impulse_while_spinning_stacks() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(20.0);
            assert!(!engine.apply_impulse(15.0));
            assert!((engine.velocity() - 35.0).abs() < 1e-9);
        }

        #[test]
        fn zero_impulse_does_nothing() {
            let mut engine = SpinEngine::default();
            assert!(!engine.apply_impulse(0.0));
            assert_eq!(engine.phase(), SpinPhase::Idle);
        }

        #[test]
        fn click_impulse_scales_and_caps() {
            let config = PhysicsConfig::default();
            assert!((config.click_impulse(1, 0.0) - 15.0).abs() < 1e-9);
            assert!((config.click_impulse(2, 0.0) - 30.0).abs() < 1e-9);
            assert!((config.click_impulse(3, 0.5) - 50.0).abs() < 1e-9);
            assert!((config.click_impulse(9, 0.0) - 45.0).abs() < 1e-9);
        }
    }

    mod rest_tests {
        use super::*;

        #[test]
        fn rest_is_reported_once_and_aligned() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(-23.7);
            let rest = run_to_rest(&mut engine);

            assert_eq!(engine.velocity(), 0.0);
            assert_eq!(engine.phase(), SpinPhase::Idle);
            assert!((rest.rotation / ANGLE_PER_SLOT).fract().abs() < 1e-9);
            assert_eq!(rest.slot, resolve_active_slot(rest.rotation));
            assert_eq!(engine.active_slot(), Some(rest.slot));
            assert_eq!(engine.tick(), TickOutcome::Idle);
        }

        #[test]
        fn decay_follows_friction() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(10.0);
            engine.tick();
            assert!((engine.velocity() - 10.0 * SPIN_FRICTION).abs() < 1e-12);
            assert!((engine.rotation() - 10.0 * SPIN_FRICTION).abs() < 1e-12);
        }

        #[test]
        fn spins_count_full_turns() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(30.0);
            let rest = run_to_rest(&mut engine);
            // Total travel of a geometric decay is about v * f / (1 - f)
            let expected = (30.0 * SPIN_FRICTION / (1.0 - SPIN_FRICTION) / 360.0).floor() as u64;
            assert!(rest.spins + 1 >= expected && rest.spins <= expected);
        }

        #[test]
        fn slow_spin_crosses_boundaries() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(59.0);
            let TickOutcome::Moving { slots_crossed } = engine.tick() else {
                panic!("expected motion");
            };
            assert_eq!(slots_crossed, 0);
            let TickOutcome::Moving { slots_crossed } = engine.tick() else {
                panic!("expected motion");
            };
            assert_eq!(slots_crossed, 1);
        }
    }

    mod infinite_tests {
        use super::*;

        #[test]
        fn infinite_holds_velocity() {
            let mut engine = SpinEngine::default();
            assert!(engine.start_infinite(70.0));
            for _ in 0..1000 {
                assert!(matches!(engine.tick(), TickOutcome::Moving { .. }));
            }
            assert!((engine.velocity() - 70.0).abs() < 1e-12);
            assert!(engine.spins() >= 194);
        }

        #[test]
        fn stop_infinite_decays_to_rest() {
            let mut engine = SpinEngine::default();
            engine.start_infinite(65.0);
            engine.tick();
            assert!(engine.stop_infinite());
            assert!(!engine.stop_infinite());
            run_to_rest(&mut engine);
            assert_eq!(engine.phase(), SpinPhase::Idle);
        }
    }

    mod drag_tests {
        use super::*;

        #[test]
        fn drag_rejected_while_spinning() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(20.0);
            assert!(!engine.begin_drag(0.0));
            engine.start_infinite(60.0);
            assert!(!engine.begin_drag(0.0));
        }

        #[test]
        fn slow_release_snaps() {
            let mut engine = SpinEngine::default();
            assert!(engine.begin_drag(10.0));
            engine.drag_pointer(20.0);
            engine.drag_pointer(42.0);
            engine.drag_pointer(44.0);
            assert!((engine.rotation() - 34.0).abs() < 1e-9);

            let release = engine.end_drag().unwrap();
            assert_eq!(release, DragRelease::Settled { rotation: 60.0 });
            assert_eq!(engine.phase(), SpinPhase::Idle);
            assert_eq!(engine.end_drag(), None);
        }

        #[test]
        fn fast_release_flings() {
            let mut engine = SpinEngine::default();
            engine.begin_drag(0.0);
            engine.drag_pointer(3.0);
            engine.drag_pointer(15.0);
            let release = engine.end_drag().unwrap();
            assert_eq!(release, DragRelease::Fling { velocity: 12.0 });
            assert!(engine.is_spinning());
            assert_eq!(engine.spins(), 0);
        }

        #[test]
        fn drag_across_seam_is_continuous() {
            let mut engine = SpinEngine::default();
            engine.begin_drag(175.0);
            engine.drag_pointer(-178.0);
            assert!((engine.rotation() - 7.0).abs() < 1e-9);
            assert!((engine.velocity() - 7.0).abs() < 1e-9);
        }

        #[test]
        fn impulse_ignored_while_dragging() {
            let mut engine = SpinEngine::default();
            engine.begin_drag(0.0);
            assert!(!engine.apply_impulse(30.0));
            assert!(engine.is_dragging());
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_zeroes_state() {
            let mut engine = SpinEngine::default();
            engine.apply_impulse(40.0);
            for _ in 0..10 {
                engine.tick();
            }
            engine.reset();
            assert_eq!(engine.rotation(), 0.0);
            assert_eq!(engine.velocity(), 0.0);
            assert_eq!(engine.phase(), SpinPhase::Idle);
            assert_eq!(engine.spins(), 0);
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn every_spin_rests_on_a_boundary(
                start in -720.0f64..720.0,
                impulse in -90.0f64..90.0,
            ) {
                prop_assume!(impulse.abs() > 0.01);
                let mut engine = SpinEngine::default();
                engine.begin_drag(0.0);
                engine.drag_to(start);
                engine.halt();
                engine.apply_impulse(impulse);
                let rest = run_to_rest(&mut engine);
                let steps = rest.rotation / ANGLE_PER_SLOT;
                prop_assert!((steps - steps.round()).abs() < 1e-9);
                prop_assert_eq!(rest.slot, resolve_active_slot(rest.rotation));
            }
        }
    }
}
