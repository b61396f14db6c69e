//! Bullets: immutable tokens loaded into chamber slots.
//!
//! A bullet carries two identities:
//! - [`BulletId`]: the instance, unique per load and never reused
//! - [`BulletType`]: the kind of bullet (a palette color, the dud, or a custom color)
//!
//! # Example
//!
//! ```
//! use cylinder::bullet::{Bullet, BulletId, BulletType};
//!
//! let bullet = Bullet::palette(BulletId::new(7), 2).unwrap();
//! assert_eq!(bullet.bullet_type(), BulletType::new(2));
//! assert_eq!(bullet.color(), "#08d9d6");
//! assert!(!bullet.is_dud());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a bullet instance.
///
/// Instance ids are handed out monotonically by whoever creates bullets and
/// are never reused across loads.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulletId(u64);

impl BulletId {
    /// Creates a new `BulletId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BulletId({})", self.0)
    }
}

impl fmt::Display for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out [`BulletId`]s in increasing order, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletIdAllocator {
    next: u64,
}

impl Default for BulletIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl BulletIdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id.
    pub fn allocate(&mut self) -> BulletId {
        let id = BulletId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`BulletIdAllocator::allocate`] returns.
    #[must_use]
    pub const fn peek(&self) -> BulletId {
        BulletId(self.next)
    }
}

/// Stable identity of a kind of bullet.
///
/// Palette bullets use ids `1..=6`. Two negative ids are reserved:
/// [`BulletType::DUD`] and [`BulletType::CUSTOM`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulletType(i64);

impl BulletType {
    /// The blank round. Never detonates.
    pub const DUD: Self = Self(-2);
    /// A user-colored bullet with no palette entry.
    ///
    /// Also used as the fallback identity for records that lost their type.
    pub const CUSTOM: Self = Self(-1);

    /// Creates a bullet type from its raw id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Returns true if this type is one of the fixed palette colors.
    #[must_use]
    pub fn is_palette(self) -> bool {
        PALETTE.iter().any(|entry| entry.id == self)
    }

    /// Returns the palette entry for this type, if any.
    #[must_use]
    pub fn palette_entry(self) -> Option<&'static PaletteEntry> {
        PALETTE.iter().find(|entry| entry.id == self)
    }
}

impl fmt::Display for BulletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DUD => write!(f, "dud"),
            Self::CUSTOM => write!(f, "custom"),
            Self(id) => write!(f, "#{id}"),
        }
    }
}

/// One fixed color of the bullet palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Type id of the palette bullet.
    pub id: BulletType,
    /// CSS hex color.
    pub color: &'static str,
}

/// The six palette bullets, in display order.
pub const PALETTE: [PaletteEntry; 6] = [
    PaletteEntry { id: BulletType(1), color: "#ff2e63" },
    PaletteEntry { id: BulletType(2), color: "#08d9d6" },
    PaletteEntry { id: BulletType(3), color: "#7c3aed" },
    PaletteEntry { id: BulletType(4), color: "#fbbf24" },
    PaletteEntry { id: BulletType(5), color: "#ec4899" },
    PaletteEntry { id: BulletType(6), color: "#10b981" },
];

/// Primer color of the dud.
pub const DUD_COLOR: &str = "#8b5e3c";
/// Name printed on the dud.
pub const DUD_NAME: &str = "Dud";
/// Message printed on the dud.
pub const DUD_MESSAGE: &str = "Just a harmless blank.";
/// Color used when a stored bullet lost its color.
pub const FALLBACK_COLOR: &str = "#ff2e63";

/// A loaded token.
///
/// Bullets are immutable once created: relabelling produces a new value via
/// [`Bullet::with_label`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    id: BulletId,
    original_id: BulletType,
    color: String,
    name: Option<String>,
    message: Option<String>,
    is_dud: bool,
    is_custom: bool,
}

impl Bullet {
    /// Creates a palette bullet. Returns `None` if `type_id` is not a palette id.
    #[must_use]
    pub fn palette(id: BulletId, type_id: i64) -> Option<Self> {
        let entry = BulletType::new(type_id).palette_entry()?;
        Some(Self {
            id,
            original_id: entry.id,
            color: entry.color.to_string(),
            name: None,
            message: None,
            is_dud: false,
            is_custom: false,
        })
    }

    /// Creates a dud.
    #[must_use]
    pub fn dud(id: BulletId) -> Self {
        Self {
            id,
            original_id: BulletType::DUD,
            color: DUD_COLOR.to_string(),
            name: Some(DUD_NAME.to_string()),
            message: Some(DUD_MESSAGE.to_string()),
            is_dud: true,
            is_custom: false,
        }
    }

    /// Creates a custom-colored bullet.
    #[must_use]
    pub fn custom(id: BulletId, color: impl Into<String>) -> Self {
        Self {
            id,
            original_id: BulletType::CUSTOM,
            color: color.into(),
            name: None,
            message: None,
            is_dud: false,
            is_custom: true,
        }
    }

    /// Creates a bullet from raw parts.
    ///
    /// Used when rebuilding bullets from stored records.
    #[must_use]
    pub fn from_parts(
        id: BulletId,
        original_id: BulletType,
        color: impl Into<String>,
        is_dud: bool,
        is_custom: bool,
    ) -> Self {
        Self {
            id,
            original_id,
            color: color.into(),
            name: None,
            message: None,
            is_dud,
            is_custom,
        }
    }

    /// Returns a copy of this bullet with the given name and message.
    #[must_use]
    pub fn with_label(mut self, name: Option<String>, message: Option<String>) -> Self {
        self.name = name;
        self.message = message;
        self
    }

    /// Returns a copy of this bullet carrying a fresh instance id.
    #[must_use]
    pub fn with_id(mut self, id: BulletId) -> Self {
        self.id = id;
        self
    }

    /// Instance id.
    #[must_use]
    pub const fn id(&self) -> BulletId {
        self.id
    }

    /// Type identity.
    #[must_use]
    pub const fn bullet_type(&self) -> BulletType {
        self.original_id
    }

    /// CSS hex color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// User-assigned name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// User-assigned message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// True for the blank round.
    #[must_use]
    pub const fn is_dud(&self) -> bool {
        self.is_dud
    }

    /// True for user-colored bullets.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        self.is_custom
    }

    /// True for bullets that take up a palette color.
    #[must_use]
    pub fn is_palette(&self) -> bool {
        !self.is_dud && !self.is_custom && self.original_id.is_palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup() {
        let bullet = Bullet::palette(BulletId::new(1), 3).unwrap();
        assert_eq!(bullet.color(), "#7c3aed");
        assert!(bullet.is_palette());
        assert!(Bullet::palette(BulletId::new(1), 7).is_none());
        assert!(Bullet::palette(BulletId::new(1), -2).is_none());
    }

    #[test]
    fn dud_is_labelled() {
        let dud = Bullet::dud(BulletId::new(4));
        assert!(dud.is_dud());
        assert!(!dud.is_palette());
        assert_eq!(dud.bullet_type(), BulletType::DUD);
        assert_eq!(dud.name(), Some(DUD_NAME));
    }

    #[test]
    fn custom_is_not_palette() {
        let bullet = Bullet::custom(BulletId::new(9), "#123456");
        assert!(bullet.is_custom());
        assert!(!bullet.is_palette());
        assert_eq!(bullet.bullet_type(), BulletType::CUSTOM);
    }

    #[test]
    fn relabel_keeps_identity() {
        let bullet = Bullet::palette(BulletId::new(2), 1).unwrap();
        let named = bullet
            .clone()
            .with_label(Some("Peacemaker".into()), Some("hi".into()));
        assert_eq!(named.id(), bullet.id());
        assert_eq!(named.name(), Some("Peacemaker"));
        assert_eq!(bullet.name(), None);
    }

    #[test]
    fn allocator_never_repeats() {
        let mut ids = BulletIdAllocator::new();
        assert_eq!(ids.peek(), BulletId::new(1));
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
        assert_eq!(ids.peek(), BulletId::new(3));
    }

    #[test]
    fn type_display() {
        assert_eq!(BulletType::DUD.to_string(), "dud");
        assert_eq!(BulletType::CUSTOM.to_string(), "custom");
        assert_eq!(BulletType::new(4).to_string(), "#4");
    }

    #[test]
    fn serializes_camel_case() {
        let bullet = Bullet::dud(BulletId::new(5));
        let json = serde_json::to_value(&bullet).unwrap();
        assert_eq!(json["originalId"], -2);
        assert_eq!(json["isDud"], true);
        let back: Bullet = serde_json::from_value(json).unwrap();
        assert_eq!(back, bullet);
    }
}
