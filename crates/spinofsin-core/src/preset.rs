//! Preset codec and preset bank.
//!
//! A [`Preset`] is a stored chamber plus the cosmetic settings around it. The
//! record types mirror the persisted JSON and tolerate old or damaged data:
//! missing fields default, slot arrays of the wrong length are padded or
//! truncated, and bullets that lost their type fall back to
//! [`BulletType::CUSTOM`].
//!
//! The [`PresetBank`] holds eight presets. Three indices have procedural
//! [`Generator`]s that run whenever the player has not saved over them.

use serde::{Deserialize, Serialize};

use cylinder::{
    Bullet, BulletId, BulletIdAllocator, BulletType, Chamber, Slot, FALLBACK_COLOR, NUM_SLOTS,
};

use crate::error::GameError;
use crate::names::BulletNames;
use crate::random::RandomSource;

/// Number of presets in the bank.
pub const PRESET_COUNT: usize = 8;

/// Name given to preset bullets that have none.
pub const PRESET_BULLET_NAME: &str = "Bullet";

/// Name of the hidden live round in [`Generator::LuckyDraw`].
pub const LUCKY_NAME: &str = "Your Luck";
/// Message of the hidden live round in [`Generator::LuckyDraw`].
pub const LUCKY_MESSAGE: &str = "Feeling lucky?";

// ============================================================================
// Cosmetics
// ============================================================================

/// Screen position of the bullet holster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PalettePosition {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Settings that change how the revolver looks, not how it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cosmetics {
    /// Chamber skin.
    pub chamber_style: String,
    /// Holster position.
    pub palette_position: PalettePosition,
    /// Whether the holster is shown.
    pub holster_visible: bool,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            chamber_style: default_style(),
            palette_position: PalettePosition { x: -280.0, y: 49.0 },
            holster_visible: true,
        }
    }
}

impl Cosmetics {
    /// Settings stored with the built-in presets.
    #[must_use]
    pub fn preset_default() -> Self {
        Self {
            palette_position: PalettePosition { x: 0.0, y: -50.0 },
            ..Self::default()
        }
    }
}

fn default_style() -> String {
    "classic".to_string()
}

const fn default_true() -> bool {
    true
}

// ============================================================================
// Records
// ============================================================================

/// Persisted bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletRecord {
    /// Instance id. Older data stored fractional ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<f64>,
    /// Type id; absent in some old records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<i64>,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// On-fire message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// CSS color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// User-colored bullet.
    #[serde(default)]
    pub is_custom: bool,
    /// Blank round.
    #[serde(default)]
    pub is_dud: bool,
}

impl BulletRecord {
    #[allow(clippy::cast_precision_loss)]
    fn capture(bullet: &Bullet) -> Self {
        Self {
            id: Some(bullet.id().as_u64() as f64),
            original_id: Some(bullet.bullet_type().as_i64()),
            name: bullet.name().map(str::to_string),
            message: bullet.message().map(str::to_string),
            color: Some(bullet.color().to_string()),
            is_custom: bullet.is_custom(),
            is_dud: bullet.is_dud(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn restore(&self) -> Bullet {
        let id = match self.id {
            Some(id) if id.is_finite() && id >= 0.0 => id as u64,
            _ => 0,
        };
        Bullet::from_parts(
            BulletId::new(id),
            self.original_id.map_or(BulletType::CUSTOM, BulletType::new),
            self.color.clone().unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            self.is_dud,
            self.is_custom,
        )
        .with_label(non_empty(self.name.as_deref()), non_empty(self.message.as_deref()))
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Persisted slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    /// Slot index at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    /// Bullet, if any.
    #[serde(default)]
    pub bullet: Option<BulletRecord>,
    /// Cover removed by firing.
    #[serde(default)]
    pub is_revealed: bool,
    /// Fired.
    #[serde(default)]
    pub is_spent: bool,
    /// Cover closed.
    #[serde(default)]
    pub is_hidden: bool,
}

/// A stored chamber configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Slots in index order.
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
    /// Chamber skin.
    #[serde(default = "default_style")]
    pub chamber_style: String,
    /// Holster position.
    #[serde(default)]
    pub bullet_palette_position: PalettePosition,
    /// Whether the holster is shown.
    #[serde(default = "default_true")]
    pub is_holster_visible: bool,
}

impl Preset {
    /// Snapshots `chamber` and `cosmetics`. In-flight loads and ejects are
    /// not part of a preset.
    #[must_use]
    pub fn capture(chamber: &Chamber, cosmetics: &Cosmetics) -> Self {
        let slots = chamber
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotRecord {
                id: Some(index),
                bullet: slot.bullet().map(BulletRecord::capture),
                is_revealed: slot.is_revealed(),
                is_spent: slot.is_spent(),
                is_hidden: slot.is_hidden(),
            })
            .collect();
        Self {
            slots,
            chamber_style: cosmetics.chamber_style.clone(),
            bullet_palette_position: cosmetics.palette_position,
            is_holster_visible: cosmetics.holster_visible,
        }
    }

    /// Rebuilds the chamber exactly as stored.
    ///
    /// Missing slots are empty; extra slots are ignored.
    #[must_use]
    pub fn restore(&self) -> Chamber {
        Chamber::from_slots(std::array::from_fn(|index| {
            self.slots.get(index).map_or_else(Slot::empty, |record| {
                Slot::from_parts(
                    record.bullet.as_ref().map(BulletRecord::restore),
                    record.is_revealed,
                    record.is_spent,
                    record.is_hidden,
                )
            })
        }))
    }

    /// Rebuilds the chamber ready to play: fresh instance ids, nothing spent
    /// or revealed, covers kept, saved names applied.
    #[must_use]
    pub fn rearm(&self, ids: &mut BulletIdAllocator, names: &BulletNames) -> Chamber {
        let restored = self.restore();
        Chamber::from_slots(std::array::from_fn(|index| {
            let slot = &restored.slots()[index];
            let Some(bullet) = slot.bullet() else {
                return Slot::empty();
            };
            let saved = names.get(bullet.bullet_type());
            let name = saved
                .map(|label| label.name.clone())
                .or_else(|| bullet.name().map(str::to_string))
                .unwrap_or_else(|| PRESET_BULLET_NAME.to_string());
            let message = saved
                .map(|label| label.message.clone())
                .or_else(|| bullet.message().map(str::to_string))
                .filter(|m| !m.is_empty());
            let armed = bullet
                .clone()
                .with_id(ids.allocate())
                .with_label(Some(name), message);
            Slot::loaded(armed).with_hidden(slot.is_hidden())
        }))
    }

    /// Cosmetic settings stored with the preset.
    #[must_use]
    pub fn cosmetics(&self) -> Cosmetics {
        Cosmetics {
            chamber_style: self.chamber_style.clone(),
            palette_position: self.bullet_palette_position,
            holster_visible: self.is_holster_visible,
        }
    }

    /// Number of slots holding a bullet.
    #[must_use]
    pub fn bullet_count(&self) -> usize {
        self.slots
            .iter()
            .take(NUM_SLOTS)
            .filter(|s| s.bullet.is_some())
            .count()
    }
}

// ============================================================================
// Generators
// ============================================================================

/// Built-in presets generated fresh on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Generator {
    /// Palette bullets 1 and 2 at slot 0 and either slot 1 or slot 5.
    TwinRounds,
    /// A covered live round and a covered dud that are never neighbours.
    LuckyDraw,
    /// Palette 1 to 3 back to back from a random slot, duds in the rest.
    /// Covers close and the chamber spins on its own shortly after.
    Gauntlet,
}

impl Generator {
    /// The generator owning bank `index`, if any.
    #[must_use]
    pub const fn for_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::TwinRounds),
            2 => Some(Self::LuckyDraw),
            3 => Some(Self::Gauntlet),
            _ => None,
        }
    }

    /// Builds a fresh chamber.
    ///
    /// `custom_color` colors the Lucky Draw round.
    pub fn generate(
        self,
        rng: &mut dyn RandomSource,
        ids: &mut BulletIdAllocator,
        custom_color: &str,
    ) -> Chamber {
        let mut slots: [Slot; NUM_SLOTS] = std::array::from_fn(|_| Slot::empty());
        match self {
            Self::TwinRounds => {
                let second = if rng.coin() { 1 } else { NUM_SLOTS - 1 };
                let (first_kind, second_kind) = if rng.coin() { (1, 2) } else { (2, 1) };
                for (index, kind) in [(0, first_kind), (second, second_kind)] {
                    slots[index] = palette_slot(ids, kind);
                }
            }
            Self::LuckyDraw => {
                let live = rng.below(NUM_SLOTS);
                let far: Vec<usize> = (0..NUM_SLOTS)
                    .filter(|&i| {
                        i != live
                            && i != (live + 1) % NUM_SLOTS
                            && i != (live + NUM_SLOTS - 1) % NUM_SLOTS
                    })
                    .collect();
                let dud = far[rng.below(far.len())];
                let lucky = Bullet::custom(ids.allocate(), custom_color).with_label(
                    Some(LUCKY_NAME.to_string()),
                    Some(LUCKY_MESSAGE.to_string()),
                );
                slots[live] = Slot::loaded(lucky).with_hidden(true);
                slots[dud] = Slot::loaded(Bullet::dud(ids.allocate())).with_hidden(true);
            }
            Self::Gauntlet => {
                const RUN: [i64; 3] = [1, 2, 3];
                let start = rng.below(NUM_SLOTS);
                for (index, slot) in slots.iter_mut().enumerate() {
                    let offset = (index + NUM_SLOTS - start) % NUM_SLOTS;
                    *slot = match RUN.get(offset) {
                        Some(&kind) => palette_slot(ids, kind),
                        None => Slot::loaded(Bullet::dud(ids.allocate())),
                    };
                }
            }
        }
        Chamber::from_slots(slots)
    }
}

fn palette_slot(ids: &mut BulletIdAllocator, kind: i64) -> Slot {
    let id = ids.allocate();
    Bullet::palette(id, kind).map_or_else(Slot::empty, Slot::loaded)
}

// ============================================================================
// Bank
// ============================================================================

/// What loading a bank index does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetEntry<'a> {
    /// Nothing to load.
    Empty,
    /// A stored preset.
    Saved {
        /// The preset.
        preset: &'a Preset,
        /// Saved by the player rather than shipped as a default.
        user_saved: bool,
    },
    /// A fresh chamber from a generator.
    Procedural(Generator),
}

/// Eight preset slots plus which of them the player saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetBank {
    presets: [Option<Preset>; PRESET_COUNT],
    user_saved: [bool; PRESET_COUNT],
}

impl Default for PresetBank {
    fn default() -> Self {
        Self {
            presets: std::array::from_fn(|_| None),
            user_saved: [false; PRESET_COUNT],
        }
    }
}

impl PresetBank {
    /// Builds a bank from stored arrays, padding or truncating both to
    /// [`PRESET_COUNT`].
    #[must_use]
    pub fn from_stored(presets: Vec<Option<Preset>>, user_saved: &[bool]) -> Self {
        let mut bank = Self::default();
        for (index, preset) in presets.into_iter().take(PRESET_COUNT).enumerate() {
            bank.presets[index] = preset;
        }
        for (index, &flag) in user_saved.iter().take(PRESET_COUNT).enumerate() {
            bank.user_saved[index] = flag;
        }
        bank
    }

    /// The bank shipped to new players.
    ///
    /// Index 0 holds a Twin Rounds placeholder, index 1 palette bullets 1 to 3
    /// on alternate slots, indices 2 and 3 empty chambers behind their
    /// generators, and 4 to 7 nothing.
    pub fn with_defaults(rng: &mut dyn RandomSource, ids: &mut BulletIdAllocator) -> Self {
        let base = Cosmetics::preset_default();
        let twin = Generator::TwinRounds.generate(rng, ids, FALLBACK_COLOR);

        let mut alternate: [Slot; NUM_SLOTS] = std::array::from_fn(|_| Slot::empty());
        for (kind, index) in [(1, 0), (2, 2), (3, 4)] {
            alternate[index] = palette_slot(ids, kind);
        }

        let empty = Preset::capture(&Chamber::new(), &base);
        let mut bank = Self::default();
        bank.presets[0] = Some(Preset::capture(&twin, &base));
        bank.presets[1] = Some(Preset::capture(&Chamber::from_slots(alternate), &base));
        bank.presets[2] = Some(empty.clone());
        bank.presets[3] = Some(empty);
        bank
    }

    /// Stored presets, for persistence.
    #[must_use]
    pub fn presets(&self) -> &[Option<Preset>; PRESET_COUNT] {
        &self.presets
    }

    /// Which presets the player saved, for persistence.
    #[must_use]
    pub fn user_saved(&self) -> &[bool; PRESET_COUNT] {
        &self.user_saved
    }

    /// What loading `index` does, or `None` past the end of the bank.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<PresetEntry<'_>> {
        let stored = self.presets.get(index)?;
        let user_saved = self.user_saved[index];
        let entry = match (stored, user_saved, Generator::for_index(index)) {
            (Some(preset), true, _) => PresetEntry::Saved {
                preset,
                user_saved: true,
            },
            (_, false, Some(generator)) => PresetEntry::Procedural(generator),
            (Some(preset), false, None) => PresetEntry::Saved {
                preset,
                user_saved: false,
            },
            (None, _, _) => PresetEntry::Empty,
        };
        Some(entry)
    }

    /// Stores `preset` at `index` as player-saved.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPreset`] if `index` is out of range.
    pub fn save(&mut self, index: usize, preset: Preset) -> Result<(), GameError> {
        let stored = self
            .presets
            .get_mut(index)
            .ok_or(GameError::InvalidPreset(index))?;
        *stored = Some(preset);
        self.user_saved[index] = true;
        Ok(())
    }

    /// Empties `index`. A generator index goes back to generating.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPreset`] if `index` is out of range.
    pub fn clear(&mut self, index: usize) -> Result<(), GameError> {
        let stored = self
            .presets
            .get_mut(index)
            .ok_or(GameError::InvalidPreset(index))?;
        *stored = None;
        self.user_saved[index] = false;
        Ok(())
    }
}
