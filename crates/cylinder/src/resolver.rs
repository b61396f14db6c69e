//! Slot resolution: continuous rotation to discrete slot.
//!
//! The chamber rotates clockwise for positive angles, so the slot sitting at
//! the firing position moves backwards through the indices as rotation grows.
//! [`resolve_active_slot`] is the only place that mapping lives; highlight and
//! fire both go through it.
//!
//! Rounding is half-up everywhere, so a rotation exactly between two slots
//! always resolves the same way regardless of sign.

use crate::{ANGLE_PER_SLOT, NUM_SLOTS};

/// Rounds to the nearest integer, with halves rounding towards positive
/// infinity.
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Maps any rotation into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(rotation: f64) -> f64 {
    let normalized = rotation.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Index of the slot at the firing position for `rotation`.
///
/// Periodic in 360 degrees and always in `0..NUM_SLOTS`.
///
/// ```
/// use cylinder::resolve_active_slot;
///
/// assert_eq!(resolve_active_slot(0.0), 0);
/// assert_eq!(resolve_active_slot(60.0), 5);
/// assert_eq!(resolve_active_slot(-60.0), 1);
/// assert_eq!(resolve_active_slot(720.0 + 120.0), 4);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn resolve_active_slot(rotation: f64) -> usize {
    let steps = round_half_up(normalize_rotation(rotation) / ANGLE_PER_SLOT) as i64;
    let slots = NUM_SLOTS as i64;
    (slots - steps).rem_euclid(slots) as usize
}

/// Nearest slot-aligned rotation. Unbounded: keeps the number of turns.
#[must_use]
pub fn snap_to_slot(rotation: f64) -> f64 {
    round_half_up(rotation / ANGLE_PER_SLOT) * ANGLE_PER_SLOT
}

/// Angle in degrees of a pointer offset `(dx, dy)` from the chamber center.
///
/// Screen coordinates: `dy` grows downwards, so positive angles are
/// clockwise, matching the chamber's rotation direction.
#[must_use]
pub fn pointer_angle(dx: f64, dy: f64) -> f64 {
    dy.atan2(dx).to_degrees()
}

/// Signed shortest angular difference `to - from`, in `(-180, 180]`.
#[must_use]
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_rotation(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod rounding_tests {
        use super::*;

        #[test]
        fn halves_round_up() {
            assert_eq!(round_half_up(0.5), 1.0);
            assert_eq!(round_half_up(-0.5), 0.0);
            assert_eq!(round_half_up(-1.5), -1.0);
            assert_eq!(round_half_up(2.4), 2.0);
        }

        #[test]
        fn normalize_wraps_negative() {
            assert_eq!(normalize_rotation(-90.0), 270.0);
            assert_eq!(normalize_rotation(725.0), 5.0);
            assert_eq!(normalize_rotation(360.0), 0.0);
            assert!(normalize_rotation(-1e-18) < 360.0);
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn every_slot_reachable() {
            let mut seen = [false; NUM_SLOTS];
            for step in 0..NUM_SLOTS {
                seen[resolve_active_slot(step as f64 * ANGLE_PER_SLOT)] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }

        #[test]
        fn tie_breaks_towards_next_step() {
            // 30 degrees is half way between slot 0 and slot 5
            assert_eq!(resolve_active_slot(30.0), 5);
            assert_eq!(resolve_active_slot(29.9), 0);
            // 330 normalizes to 5.5 steps, which rounds to 6 and wraps to 0
            assert_eq!(resolve_active_slot(-30.0), 0);
        }

        #[test]
        fn near_full_turn_wraps_to_zero() {
            assert_eq!(resolve_active_slot(359.0), 0);
            assert_eq!(resolve_active_slot(-1.0), 0);
        }

        #[test]
        fn snap_keeps_turns() {
            assert_eq!(snap_to_slot(371.0), 360.0);
            assert_eq!(snap_to_slot(-95.0), -120.0);
            assert_eq!(snap_to_slot(90.0), 120.0);
        }
    }

    mod pointer_tests {
        use super::*;

        #[test]
        fn pointer_quadrants() {
            assert!((pointer_angle(1.0, 0.0)).abs() < 1e-9);
            assert!((pointer_angle(0.0, 1.0) - 90.0).abs() < 1e-9);
            assert!((pointer_angle(-1.0, 0.0) - 180.0).abs() < 1e-9);
        }

        #[test]
        fn delta_unwraps_across_seam() {
            assert!((angle_delta(170.0, -170.0) - 20.0).abs() < 1e-9);
            assert!((angle_delta(-170.0, 170.0) + 20.0).abs() < 1e-9);
            assert!((angle_delta(10.0, 40.0) - 30.0).abs() < 1e-9);
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn resolve_is_periodic(degrees in -100_000i32..100_000, turns in -50i64..50) {
                let r = f64::from(degrees);
                let shifted = r + 360.0 * turns as f64;
                prop_assert_eq!(resolve_active_slot(r), resolve_active_slot(shifted));
            }

            #[test]
            fn resolve_in_range(r in -1.0e7f64..1.0e7) {
                prop_assert!(resolve_active_slot(r) < NUM_SLOTS);
            }

            #[test]
            fn snapped_rotation_is_aligned(r in -1.0e5f64..1.0e5) {
                let snapped = snap_to_slot(r);
                let steps = snapped / ANGLE_PER_SLOT;
                prop_assert!((steps - steps.round()).abs() < 1e-9);
                prop_assert!((snapped - r).abs() <= ANGLE_PER_SLOT / 2.0 + 1e-9);
            }

            #[test]
            fn snapped_rotation_resolves_consistently(r in -1.0e5f64..1.0e5) {
                let snapped = snap_to_slot(r);
                prop_assert_eq!(resolve_active_slot(snapped), resolve_active_slot(snapped + 360.0));
            }
        }
    }
}
