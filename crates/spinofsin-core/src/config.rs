//! Game configuration.
//!
//! Every timing is in milliseconds. Missing fields take their defaults, so a
//! configuration file only needs the values it changes:
//!
//! ```
//! use spinofsin_core::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "fire_settle_ms": 250 }"#).unwrap();
//! assert_eq!(config.fire_settle_ms, 250);
//! assert_eq!(config.reset_ms, 600);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use cylinder::{EjectSpeed, PhysicsConfig};

use crate::error::ConfigError;

/// Tunables for the game layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Spin engine tuning.
    pub physics: PhysicsConfig,

    /// Load animation before the bullet seats.
    pub load_ms: u64,
    /// Alt-click eject.
    pub fast_eject_ms: u64,
    /// Regular eject.
    pub eject_ms: u64,
    /// Reset transient; spin and fire are blocked for its duration.
    pub reset_ms: u64,
    /// Pause between uncovering a hidden bullet and detonating it.
    pub reveal_ms: u64,
    /// Time spent in `fired` before returning to `ready` or `loading`.
    pub fire_settle_ms: u64,
    /// Settle after the chamber comes to rest.
    pub rest_settle_ms: u64,
    /// Delay between the settle and an implicit fire.
    pub auto_fire_ms: u64,
    /// The spin counter clears this long after a rest.
    pub spin_count_clear_ms: u64,
    /// Rapid hub clicks within this window stack their impulses.
    pub click_window_ms: u64,
    /// Preset content lands this long after the chamber clears.
    pub preset_apply_ms: u64,
    /// Quick load fills the chamber this long after its reset starts.
    pub quick_load_ms: u64,
    /// Gauntlet covers every bullet this long after it lands.
    pub gauntlet_cover_ms: u64,
    /// Gauntlet spins the chamber this long after it lands.
    pub gauntlet_spin_ms: u64,
    /// Notices dismiss themselves after this long.
    pub notice_ms: u64,

    /// Lowest infinite-spin speed.
    pub infinite_velocity: f64,
    /// Random spread added on top of `infinite_velocity`.
    pub infinite_velocity_jitter: f64,
    /// Lowest Gauntlet spin speed.
    pub gauntlet_velocity: f64,
    /// Random spread added on top of `gauntlet_velocity`.
    pub gauntlet_velocity_jitter: f64,

    /// Interval between heat samples.
    pub heat_sample_ms: u64,
    /// Fraction of the gap to the chamber speed closed per sample.
    pub heat_easing: f64,
    /// Per-sample decay of the gauge while the chamber is not spinning.
    pub heat_decay: f64,
    /// Speed at which heat reads 1.0.
    pub heat_max_speed: f64,
    /// Heat at or above which the chamber counts as overheating.
    pub heat_threshold: f64,
    /// Overheating must last this long before smoke starts.
    pub heat_sustain_ms: u64,

    /// Color used for custom bullets until the player picks one.
    pub custom_color: String,
    /// Ask for a name the first time each palette bullet is loaded.
    pub naming_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            load_ms: 500,
            fast_eject_ms: 200,
            eject_ms: 600,
            reset_ms: 600,
            reveal_ms: 350,
            fire_settle_ms: 1000,
            rest_settle_ms: 400,
            auto_fire_ms: 50,
            spin_count_clear_ms: 1500,
            click_window_ms: 100,
            preset_apply_ms: 100,
            quick_load_ms: 700,
            gauntlet_cover_ms: 1500,
            gauntlet_spin_ms: 1600,
            notice_ms: 3000,
            infinite_velocity: 60.0,
            infinite_velocity_jitter: 20.0,
            gauntlet_velocity: 10.0,
            gauntlet_velocity_jitter: 5.0,
            heat_sample_ms: 50,
            heat_easing: 0.1,
            heat_decay: 0.9,
            heat_max_speed: 75.0,
            heat_threshold: 0.95,
            heat_sustain_ms: 2000,
            custom_color: "#cc0011".to_string(),
            naming_enabled: false,
        }
    }
}

impl GameConfig {
    /// Parses a JSON configuration document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields, and
    /// [`ConfigError::OutOfRange`] for values [`GameConfig::validate`] rejects.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would stall or explode the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if !(physics.friction > 0.0 && physics.friction < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "physics.friction",
                reason: "must be between 0 and 1",
            });
        }
        if physics.min_velocity <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "physics.min_velocity",
                reason: "must be positive",
            });
        }
        if physics.fling_threshold < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "physics.fling_threshold",
                reason: "must not be negative",
            });
        }
        if self.heat_sample_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "heat_sample_ms",
                reason: "must be positive",
            });
        }
        if self.heat_max_speed <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "heat_max_speed",
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.heat_easing) || !(0.0..=1.0).contains(&self.heat_decay) {
            return Err(ConfigError::OutOfRange {
                field: "heat_easing",
                reason: "easing and decay must be between 0 and 1",
            });
        }
        Ok(())
    }

    /// Eject delay for `speed`.
    #[must_use]
    pub fn eject_delay(&self, speed: EjectSpeed) -> Duration {
        match speed {
            EjectSpeed::Fast => ms(self.fast_eject_ms),
            EjectSpeed::Normal => ms(self.eject_ms),
        }
    }
}

/// Shorthand for [`Duration::from_millis`].
#[must_use]
pub const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
