//! Audio cue collaborator.
//!
//! The game never plays sound itself. It tells an [`AudioSink`] which cue
//! fits the moment and whether the spin loop should be running.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One-shot sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioCue {
    /// A bullet starts seating.
    Load,
    /// The chamber starts spinning.
    SpinStart,
    /// The chamber stops.
    SpinEnd,
    /// Cover toggle or eject.
    Click,
    /// Live round detonates.
    Fire,
    /// Reset begins.
    Reset,
    /// A notice appears.
    Error,
    /// A bullet is picked out of the holster.
    Pickup,
    /// A dud misfires.
    Thunk,
    /// The hammer falls on an empty slot.
    DryFire,
}

impl AudioCue {
    /// Stable name of the cue.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::SpinStart => "spin-start",
            Self::SpinEnd => "spin-end",
            Self::Click => "click",
            Self::Fire => "fire",
            Self::Reset => "reset",
            Self::Error => "error",
            Self::Pickup => "pickup",
            Self::Thunk => "thunk",
            Self::DryFire => "dry-fire",
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the game's audio decisions.
pub trait AudioSink {
    /// Plays a one-shot cue.
    fn play(&mut self, cue: AudioCue);

    /// Starts or stops the looping spin sound.
    fn set_spin_loop(&mut self, playing: bool);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}

    fn set_spin_loop(&mut self, _playing: bool) {}
}

/// What a [`RecordingAudio`] heard.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AudioLog {
    /// One-shot cues in the order they were played.
    pub cues: Vec<AudioCue>,
    /// Whether the spin loop is currently playing.
    pub spin_loop: bool,
}

/// Records cues into a shared [`AudioLog`].
///
/// The sink is handed to the game while the caller keeps a clone of the
/// log handle to inspect afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    log: Rc<RefCell<AudioLog>>,
}

impl RecordingAudio {
    /// Creates a recorder and a handle to its log.
    #[must_use]
    pub fn new() -> (Self, Rc<RefCell<AudioLog>>) {
        let recorder = Self::default();
        let log = Rc::clone(&recorder.log);
        (recorder, log)
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.log.borrow_mut().cues.push(cue);
    }

    fn set_spin_loop(&mut self, playing: bool) {
        self.log.borrow_mut().spin_loop = playing;
    }
}
