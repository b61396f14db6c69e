//! Test module for determinism and integration tests.
//!
//! - `determinism.rs`: same seed and inputs give the same game
//! - `integration.rs`: end-to-end play through the public `Game` surface
//! - `helpers.rs`: scripted collaborators and game builders

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;
