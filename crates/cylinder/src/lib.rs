//! # Cylinder
//!
//! The mechanical substrate of a six-shot revolver toy.
//!
//! Cylinder models the parts of the revolver that have no notion of time,
//! sound, or storage:
//!
//! - **Chamber**: six fixed slots, each holding at most one bullet
//! - **Bullets**: immutable tokens identified by instance and by type
//! - **Spin physics**: impulses, friction decay, drag and fling, rest detection
//! - **Slot resolution**: which slot sits at the firing position for a rotation
//!
//! Everything that sequences these parts over time (timers, audio cues,
//! persistence) lives one layer up in `spinofsin-core`.
//!
//! ## Quick Start
//!
//! ```
//! use cylinder::{resolve_active_slot, Bullet, BulletId, Chamber, SpinEngine, TickOutcome};
//!
//! let mut chamber = Chamber::new();
//! chamber.load_bullet(0, Bullet::palette(BulletId::new(1), 1).unwrap()).unwrap();
//! chamber.commit_load(0);
//!
//! let mut engine = SpinEngine::default();
//! engine.apply_impulse(12.0);
//! let rest = loop {
//!     if let TickOutcome::Rest(rest) = engine.tick() {
//!         break rest;
//!     }
//! };
//! assert_eq!(rest.slot, resolve_active_slot(rest.rotation));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bullet;
pub mod chamber;
pub mod hash;
pub mod physics;
pub mod resolver;
pub mod slot;

// Re-exports for convenience
pub use bullet::{
    Bullet, BulletId, BulletIdAllocator, BulletType, PaletteEntry, DUD_COLOR, FALLBACK_COLOR, PALETTE,
};
pub use chamber::{Chamber, ChamberError};
pub use hash::hash_chamber;
pub use physics::{DragRelease, PhysicsConfig, RestEvent, SpinEngine, SpinPhase, TickOutcome};
pub use resolver::{
    angle_delta, normalize_rotation, pointer_angle, resolve_active_slot, round_half_up, snap_to_slot,
};
pub use slot::{EjectSpeed, Slot, SlotPhase};

/// Number of slots in the chamber.
pub const NUM_SLOTS: usize = 6;

/// Angular width of one slot in degrees.
#[allow(clippy::cast_precision_loss)]
pub const ANGLE_PER_SLOT: f64 = 360.0 / NUM_SLOTS as f64;

/// Per-tick velocity multiplier applied while a spin decays.
pub const SPIN_FRICTION: f64 = 0.985;

/// Velocity magnitude (degrees per tick) below which a spin comes to rest.
pub const MIN_SPIN_VELOCITY: f64 = 0.05;

/// Release velocity (degrees per tick) above which a drag becomes a spin.
pub const FLING_THRESHOLD: f64 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_width_divides_circle() {
        assert!((ANGLE_PER_SLOT * NUM_SLOTS as f64 - 360.0).abs() < 1e-9);
        assert!((ANGLE_PER_SLOT - 60.0).abs() < 1e-9);
    }

    #[test]
    fn friction_decays() {
        assert!(SPIN_FRICTION < 1.0);
        assert!(MIN_SPIN_VELOCITY < FLING_THRESHOLD);
    }
}
