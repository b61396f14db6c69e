//! Test helpers: scripted collaborators and game builders.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::audio::{AudioLog, RecordingAudio};
use crate::config::{ms, GameConfig};
use crate::game::{BulletChoice, Game};
use crate::random::RandomSource;
use crate::store::MemoryStore;

/// One render frame at 60 Hz.
pub const FRAME: Duration = ms(16);

// =============================================================================
// Collaborators
// =============================================================================

/// Replays a fixed list of unit samples, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    /// Creates a source that yields `values` in order.
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "scripted random needs values");
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

/// A game wired to shared handles for inspection.
pub struct Harness {
    pub game: Game,
    pub store: Rc<RefCell<MemoryStore>>,
    pub audio: Rc<RefCell<AudioLog>>,
}

/// Builds a harness over `store` with scripted randomness.
pub fn harness_with(
    config: GameConfig,
    store: Rc<RefCell<MemoryStore>>,
    random: ScriptedRandom,
) -> Harness {
    let (recorder, audio) = RecordingAudio::new();
    let game = Game::new(
        config,
        Box::new(Rc::clone(&store)),
        Box::new(recorder),
        Box::new(random),
    );
    Harness { game, store, audio }
}

/// Builds a harness on a fresh store; every random draw returns `unit`.
pub fn harness(unit: f64) -> Harness {
    harness_with(
        GameConfig::default(),
        Rc::new(RefCell::new(MemoryStore::new())),
        ScriptedRandom::new(&[unit]),
    )
}

// =============================================================================
// Driving
// =============================================================================

/// Loads every `(slot, choice)` and waits for the loads to seat.
pub fn load_all(game: &mut Game, loads: &[(usize, BulletChoice)]) {
    for &(slot, choice) in loads {
        game.load(slot, choice).expect("load should be accepted");
    }
    game.run_for(ms(game.config().load_ms), FRAME);
}

/// Ticks until the engine stops, returning the number of frames it took.
pub fn spin_until_rest(game: &mut Game) -> u32 {
    let mut frames = 0;
    while game.engine().is_spinning() {
        game.tick(FRAME);
        frames += 1;
        assert!(frames < 100_000, "spin never came to rest");
    }
    frames
}

/// Drags the chamber by `degrees` in 3 degree steps and lets go.
pub fn slow_drag(game: &mut Game, degrees: f64) {
    assert!(game.begin_drag(0.0), "drag should be accepted");
    let steps = (degrees.abs() / 3.0).round() as i64;
    let step = 3.0_f64.copysign(degrees);
    let mut angle = 0.0;
    for _ in 0..steps {
        angle += step;
        game.drag(angle);
    }
    game.end_drag();
}
