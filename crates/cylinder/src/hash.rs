//! State hashing for determinism checks.
//!
//! Two runs fed the same inputs and the same random seed must end with the
//! same hash. Floats are hashed by bit pattern.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::chamber::Chamber;
use crate::physics::SpinEngine;

/// Computes a deterministic hash of the chamber and the engine.
///
/// Covers every slot (bullet identity, flags, in-flight loads and ejects)
/// plus rotation, velocity and phase.
#[must_use]
pub fn hash_chamber(chamber: &Chamber, engine: &SpinEngine) -> u64 {
    let mut hasher = DefaultHasher::new();

    for (index, slot) in chamber.slots().iter().enumerate() {
        index.hash(&mut hasher);
        slot.hash(&mut hasher);
    }

    engine.rotation().to_bits().hash(&mut hasher);
    engine.velocity().to_bits().hash(&mut hasher);
    engine.phase().hash(&mut hasher);

    hasher.finish()
}
