//! # Spin of Sin Core
//!
//! The game built on top of the [`cylinder`] mechanics.
//!
//! This crate sequences the chamber and spin engine over time and owns
//! everything that outlives a single spin:
//!
//! - **Game**: the `loading / ready / spinning / fired` state machine, input
//!   handling, and the fire and reset sequences
//! - **Scheduler**: generation-tagged timers on a virtual clock
//! - **Presets**: the eight-entry bank, procedural generators and the
//!   tolerant preset codec
//! - **Profile**: persisted presets, spin totals, counter visibility and
//!   bullet names behind a [`KeyValueStore`]
//! - **Collaborators**: [`AudioSink`] for sound cues and [`RandomSource`] for
//!   jitter and generators
//!
//! ## Usage
//!
//! ```
//! use spinofsin_core::{BulletChoice, Game, GameConfig, GameEvent};
//! use std::time::Duration;
//!
//! let frame = Duration::from_millis(16);
//! let mut game = Game::with_seed(GameConfig::default(), 42);
//!
//! game.click_to_load(BulletChoice::Palette(1)).unwrap();
//! game.run_for(Duration::from_millis(500), frame);
//! assert!(game.fire());
//!
//! let fired = game
//!     .take_events()
//!     .into_iter()
//!     .any(|event| matches!(event, GameEvent::Fired { slot: 0, .. }));
//! assert!(fired);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use cylinder;

pub mod audio;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod heat;
pub mod names;
pub mod preset;
pub mod profile;
pub mod random;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use audio::{AudioCue, AudioLog, AudioSink, NullAudio, RecordingAudio};
pub use config::GameConfig;
pub use error::{ConfigError, GameError, StoreError};
pub use event::{CasingSide, EventLog, FireOutcome, GameEvent};
pub use game::{BulletChoice, Game, GameState, Key, Modifiers, Notice, PendingName};
pub use heat::HeatGauge;
pub use names::{BulletLabel, BulletNames};
pub use preset::{Cosmetics, Generator, Preset, PresetBank, PresetEntry, PRESET_COUNT};
pub use profile::Profile;
pub use random::{RandomSource, SeededRandom};
pub use scheduler::{Scheduler, TimerId};
pub use store::{KeyValueStore, MemoryStore};
