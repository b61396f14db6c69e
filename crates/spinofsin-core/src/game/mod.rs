//! The game state machine.
//!
//! [`Game`] owns the chamber, the spin engine, the timers and every
//! collaborator, and is the single authority on [`GameState`]. The host
//! drives it with input calls and one [`Game::tick`] per render frame, then
//! drains [`Game::take_events`] to animate.
//!
//! # Sequencing
//!
//! At most one of {spin to rest, fire, reset} is in flight at a time. Fire
//! during a reset or another fire is dropped without a notice. A reset bumps
//! the timer generation, so every deferred step scheduled before it is
//! discarded when it comes due.
//!
//! A fire resolves the slot at the pin, uncovers it if covered and waits,
//! detonates, then settles back to `ready` or `loading`.
//!
//! # Example
//!
//! ```
//! use spinofsin_core::{BulletChoice, Game, GameConfig, GameState, Modifiers};
//! use std::time::Duration;
//!
//! let mut game = Game::with_seed(GameConfig::default(), 7);
//! game.load(0, BulletChoice::Palette(1)).unwrap();
//! game.run_for(Duration::from_millis(600), Duration::from_millis(16));
//! assert_eq!(game.state(), GameState::Ready);
//!
//! game.click_hub(Modifiers::default());
//! assert_eq!(game.state(), GameState::Spinning);
//! ```

mod fire;
mod input;
mod loading;
mod presets;

pub use input::{Key, Modifiers};
pub use loading::{BulletChoice, FATE_MESSAGE};

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use cylinder::{
    hash_chamber, Bullet, BulletIdAllocator, Chamber, SpinEngine, TickOutcome,
};

use crate::audio::{AudioCue, AudioSink, NullAudio};
use crate::config::{ms, GameConfig};
use crate::error::GameError;
use crate::event::{EventLog, GameEvent};
use crate::heat::{HeatGauge, SmokeChange};
use crate::names::BulletNames;
use crate::preset::{Cosmetics, PresetBank};
use crate::profile::{self, Profile};
use crate::random::{RandomSource, SeededRandom};
use crate::scheduler::Scheduler;
use crate::store::{KeyValueStore, MemoryStore};

/// The authoritative game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// Nothing live in the chamber.
    Loading,
    /// Live rounds loaded, chamber at rest.
    Ready,
    /// Spinning, or settling after a spin.
    Spinning,
    /// The hammer fell; settling.
    Fired,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Spinning => "spinning",
            Self::Fired => "fired",
        };
        f.write_str(name)
    }
}

/// Debounce keys for timers that replace their predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKey {
    ClickWindow,
    SpinCountClear,
    PresetApply,
    GauntletCover,
    GauntletSpin,
    QuickLoadFill,
}

/// Deferred steps.
#[derive(Debug, Clone, PartialEq)]
enum Timer {
    CommitLoad { slot: usize },
    FinishEject { slot: usize },
    FinishReset,
    Detonate { slot: usize },
    FireSettled,
    RestSettled { rotation: f64 },
    AutoFire { rotation: f64 },
    ClearSpinCount,
    CloseClickWindow,
    ApplyPreset { index: usize },
    CoverAll,
    GauntletSpin,
    QuickLoadFill,
}

/// A transient message for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text shown.
    pub text: String,
    /// Virtual time at which it goes away.
    pub expires_at: Duration,
}

/// A load waiting for the player to name its bullet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingName {
    /// Target slot.
    pub slot: usize,
    /// The bullet to load once named.
    pub bullet: Bullet,
}

/// The revolver game.
pub struct Game {
    config: GameConfig,
    chamber: Chamber,
    engine: SpinEngine,
    state: GameState,
    timers: Scheduler<Timer, TimerKey>,
    events: EventLog,
    audio: Box<dyn AudioSink>,
    random: Box<dyn RandomSource>,
    store: Box<dyn KeyValueStore>,
    ids: BulletIdAllocator,

    presets: PresetBank,
    names: BulletNames,
    total_spins: u64,
    counter_visible: bool,

    cosmetics: Cosmetics,
    custom_color: String,
    naming_enabled: bool,
    show_slot_numbers: bool,
    hovered: Option<BulletChoice>,
    heat: HeatGauge,

    resetting: bool,
    firing: bool,
    spin_intentional: bool,
    spin_count: u64,
    click_count: u32,
    notice: Option<Notice>,
    pending_name: Option<PendingName>,
    last_fired: Option<Bullet>,
    frame: u64,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("chamber", &self.chamber)
            .field("engine", &self.engine)
            .field("now", &self.timers.now())
            .field("pending_timers", &self.timers.live_len())
            .field("resetting", &self.resetting)
            .field("firing", &self.firing)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game, loading the profile from `store`.
    ///
    /// If the stored presets were missing or damaged, the repaired bank is
    /// written back straight away.
    #[must_use]
    pub fn new(
        config: GameConfig,
        mut store: Box<dyn KeyValueStore>,
        audio: Box<dyn AudioSink>,
        mut random: Box<dyn RandomSource>,
    ) -> Self {
        let mut ids = BulletIdAllocator::new();
        let (profile, rewrite) = Profile::load(store.as_ref(), random.as_mut(), &mut ids);
        if rewrite {
            profile::save_presets(store.as_mut(), &profile.presets);
        }
        let Profile {
            presets,
            total_spins,
            counter_visible,
            names,
        } = profile;

        tracing::debug!(
            "game created: total_spins={} names={}",
            total_spins,
            names.len()
        );

        Self {
            chamber: Chamber::new(),
            engine: SpinEngine::new(config.physics.clone()),
            state: GameState::Loading,
            timers: Scheduler::new(),
            events: EventLog::new(),
            audio,
            random,
            store,
            ids,
            presets,
            names,
            total_spins,
            counter_visible,
            cosmetics: Cosmetics::default(),
            custom_color: config.custom_color.clone(),
            naming_enabled: config.naming_enabled,
            show_slot_numbers: true,
            hovered: None,
            heat: HeatGauge::new(&config),
            resetting: false,
            firing: false,
            spin_intentional: false,
            spin_count: 0,
            click_count: 0,
            notice: None,
            pending_name: None,
            last_fired: None,
            frame: 0,
            config,
        }
    }

    /// Creates a game with an in-memory store, no audio and a seeded random
    /// source.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(
            config,
            Box::new(MemoryStore::new()),
            Box::new(NullAudio),
            Box::new(SeededRandom::new(seed)),
        )
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advances one render frame lasting `dt` of wall-clock time.
    ///
    /// The spin engine steps once; heat, timers and notices advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.frame += 1;

        match self.engine.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Moving { slots_crossed } => self.on_motion(slots_crossed),
            TickOutcome::Rest(rest) => self.on_rest(rest),
        }

        let change = self
            .heat
            .advance(dt, self.engine.velocity(), self.engine.is_spinning());
        match change {
            Some(SmokeChange::Started) => self.events.push(GameEvent::SmokeStarted),
            Some(SmokeChange::Stopped) => self.events.push(GameEvent::SmokeStopped),
            None => {}
        }

        let until = self.timers.now() + dt;
        while let Some(timer) = self.timers.pop_due(until) {
            self.run_timer(timer);
        }
        self.timers.advance_to(until);

        self.expire_notice();
    }

    /// Ticks with frames of `frame` until `total` has passed.
    pub fn run_for(&mut self, total: Duration, frame: Duration) {
        if frame.is_zero() {
            return;
        }
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let step = frame.min(total - elapsed);
            self.tick(step);
            elapsed += step;
        }
    }

    fn run_timer(&mut self, timer: Timer) {
        tracing::trace!("timer {:?} at {:?}", timer, self.timers.now());
        match timer {
            Timer::CommitLoad { slot } => self.commit_load(slot),
            Timer::FinishEject { slot } => self.finish_eject(slot),
            Timer::FinishReset => self.finish_reset(),
            Timer::Detonate { slot } => self.detonate(slot),
            Timer::FireSettled => self.finish_fire(),
            Timer::RestSettled { rotation } => self.finish_rest(rotation),
            Timer::AutoFire { rotation } => self.auto_fire(rotation),
            Timer::ClearSpinCount => self.clear_spin_count(),
            Timer::CloseClickWindow => self.click_count = 0,
            Timer::ApplyPreset { index } => self.apply_preset(index),
            Timer::CoverAll => self.cover_all(),
            Timer::GauntletSpin => self.gauntlet_spin(),
            Timer::QuickLoadFill => self.fill_quick_load(),
        }
    }

    fn schedule(&mut self, delay_ms: u64, timer: Timer) {
        tracing::debug!("scheduling {:?} in {}ms", timer, delay_ms);
        self.timers.schedule(ms(delay_ms), timer);
    }

    // ========================================================================
    // State helpers
    // ========================================================================

    fn set_state(&mut self, to: GameState) {
        if self.state != to {
            tracing::debug!("state {} -> {}", self.state, to);
            self.events.push(GameEvent::StateChanged {
                from: self.state,
                to,
            });
            self.state = to;
        }
    }

    /// True from the trigger pull until the fire settles.
    fn fire_in_flight(&self) -> bool {
        self.firing || self.state == GameState::Fired
    }

    /// `ready` with live rounds loaded, `loading` otherwise.
    fn settled_state(&self) -> GameState {
        if self.chamber.has_live_rounds() {
            GameState::Ready
        } else {
            GameState::Loading
        }
    }

    fn play(&mut self, cue: AudioCue) {
        self.audio.play(cue);
    }

    /// Shows `err` as a notice with the error cue and hands it back.
    fn reject(&mut self, err: GameError) -> GameError {
        let text = err.to_string();
        tracing::debug!("rejected: {}", text);
        self.play(AudioCue::Error);
        self.events.push(GameEvent::Notice { text: text.clone() });
        self.notice = Some(Notice {
            text,
            expires_at: self.timers.now() + ms(self.config.notice_ms),
        });
        err
    }

    fn expire_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.expires_at <= self.timers.now())
        {
            self.notice = None;
            self.events.push(GameEvent::NoticeCleared);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// The chamber.
    #[must_use]
    pub fn chamber(&self) -> &Chamber {
        &self.chamber
    }

    /// The spin engine.
    #[must_use]
    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    /// Current rotation in degrees.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.engine.rotation()
    }

    /// Slot at the firing position, `None` while spinning.
    #[must_use]
    pub fn active_slot(&self) -> Option<usize> {
        self.engine.active_slot()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Virtual time since the game started.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Frames ticked so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// True during the reset transient.
    #[must_use]
    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// True from the moment a fire resolves until it settles.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Full turns of the current or most recent spin.
    #[must_use]
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// Lifetime full turns.
    #[must_use]
    pub fn total_spins(&self) -> u64 {
        self.total_spins
    }

    /// Whether the spin counter is shown.
    #[must_use]
    pub fn counter_visible(&self) -> bool {
        self.counter_visible
    }

    /// The notice on screen, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The load waiting for a name, if any.
    #[must_use]
    pub fn pending_name(&self) -> Option<&PendingName> {
        self.pending_name.as_ref()
    }

    /// The bullet fired most recently since the last reset.
    #[must_use]
    pub fn last_fired(&self) -> Option<&Bullet> {
        self.last_fired.as_ref()
    }

    /// The preset bank.
    #[must_use]
    pub fn presets(&self) -> &PresetBank {
        &self.presets
    }

    /// Saved bullet names.
    #[must_use]
    pub fn names(&self) -> &BulletNames {
        &self.names
    }

    /// Cosmetic settings.
    #[must_use]
    pub fn cosmetics(&self) -> &Cosmetics {
        &self.cosmetics
    }

    /// Color for custom bullets.
    #[must_use]
    pub fn custom_color(&self) -> &str {
        &self.custom_color
    }

    /// Whether palette bullets ask for a name.
    #[must_use]
    pub fn naming_enabled(&self) -> bool {
        self.naming_enabled
    }

    /// Whether slot numbers are drawn.
    #[must_use]
    pub fn show_slot_numbers(&self) -> bool {
        self.show_slot_numbers
    }

    /// The holster bullet under the pointer.
    #[must_use]
    pub fn hovered(&self) -> Option<BulletChoice> {
        self.hovered
    }

    /// Chamber heat gauge.
    #[must_use]
    pub fn heat(&self) -> &HeatGauge {
        &self.heat
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.events.events()
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }

    /// Deterministic hash of the playable state.
    ///
    /// Two games built with the same seed and fed the same inputs hash equal.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        hash_chamber(&self.chamber, &self.engine).hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.timers.now().hash(&mut hasher);
        self.spin_count.hash(&mut hasher);
        self.total_spins.hash(&mut hasher);
        self.resetting.hash(&mut hasher);
        self.firing.hash(&mut hasher);
        self.ids.peek().hash(&mut hasher);
        hasher.finish()
    }
}
