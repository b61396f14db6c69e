//! Chamber heat.
//!
//! A smoothed reading of how fast the chamber turns, sampled on wall-clock
//! time rather than per frame. Holding the chamber near top speed long
//! enough makes it smoke.

use std::time::Duration;

use crate::config::{ms, GameConfig};

/// Smoke state change reported by [`HeatGauge::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeChange {
    /// Overheating lasted long enough.
    Started,
    /// The chamber cooled or stopped.
    Stopped,
}

/// Smoothed spin speed and overheating tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGauge {
    sample_every: Duration,
    easing: f64,
    decay: f64,
    max_speed: f64,
    threshold: f64,
    sustain: Duration,

    speed: f64,
    since_sample: Duration,
    hot_for: Option<Duration>,
    smoking: bool,
}

impl HeatGauge {
    /// Creates a cold gauge.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            sample_every: ms(config.heat_sample_ms.max(1)),
            easing: config.heat_easing,
            decay: config.heat_decay,
            max_speed: config.heat_max_speed,
            threshold: config.heat_threshold,
            sustain: ms(config.heat_sustain_ms),
            speed: 0.0,
            since_sample: Duration::ZERO,
            hot_for: None,
            smoking: false,
        }
    }

    /// Smoothed speed in degrees per frame.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Heat in `[0, 1]`.
    #[must_use]
    pub fn heat(&self) -> f64 {
        (self.speed / self.max_speed).min(1.0)
    }

    /// True while the chamber smokes.
    #[must_use]
    pub fn is_smoking(&self) -> bool {
        self.smoking
    }

    /// Advances the gauge by `dt` of wall-clock time.
    ///
    /// `velocity` is the chamber's current angular velocity. Returns the smoke
    /// change if one happened during this step.
    pub fn advance(&mut self, dt: Duration, velocity: f64, spinning: bool) -> Option<SmokeChange> {
        let was_smoking = self.smoking;
        self.since_sample += dt;
        while self.since_sample >= self.sample_every {
            self.since_sample -= self.sample_every;
            self.sample(velocity.abs(), spinning);
        }
        match (was_smoking, self.smoking) {
            (false, true) => Some(SmokeChange::Started),
            (true, false) => Some(SmokeChange::Stopped),
            _ => None,
        }
    }

    /// Drops straight to cold. Returns true if the chamber was smoking.
    pub fn cool(&mut self) -> bool {
        let was_smoking = self.smoking;
        self.speed = 0.0;
        self.since_sample = Duration::ZERO;
        self.hot_for = None;
        self.smoking = false;
        was_smoking
    }

    fn sample(&mut self, target: f64, spinning: bool) {
        if spinning {
            self.speed += (target - self.speed) * self.easing;
        } else {
            self.speed *= self.decay;
            if self.speed < 0.1 {
                self.speed = 0.0;
            }
        }

        if spinning && self.heat() >= self.threshold {
            let hot_for = self.hot_for.map_or(Duration::ZERO, |t| t + self.sample_every);
            self.hot_for = Some(hot_for);
            if hot_for >= self.sustain && !self.smoking {
                tracing::debug!("chamber overheating for {:?}, smoke on", hot_for);
                self.smoking = true;
            }
        } else {
            self.hot_for = None;
            self.smoking = false;
        }
    }
}
