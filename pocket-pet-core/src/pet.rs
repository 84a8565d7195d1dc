//! Pet record and bounded stat types.
//!
//! A [`Pet`] is created once and then only its stats and interaction time
//! change. Identity, name, appearance and creation time are fixed for the
//! lifetime of the record, so they are exposed through getters only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name given by `reinitialize()` to a fresh default pet.
pub const DEFAULT_NAME: &str = "Meow Meow Fuzzyface";

/// Appearance given by `reinitialize()` to a fresh default pet.
pub const DEFAULT_APPEARANCE: &str = "🐱";

/// The preset appearances offered to a player when creating a pet.
pub const PRESET_APPEARANCES: [&str; 8] = ["🐱", "🐶", "🐦", "🐰", "🐼", "🦊", "🐸", "🐢"];

/// A well-being value clamped to `0..=100`.
///
/// There is no way to build a `Stat` outside that range: construction and
/// arithmetic saturate at the bounds. Deserialization rejects out-of-range
/// and non-integer values instead of clamping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Stat(u8);

impl Stat {
    /// Lowest possible value.
    pub const MIN: Stat = Stat(0);
    /// Highest possible value, and the value every stat starts at.
    pub const MAX: Stat = Stat(100);

    /// Build a stat, clamping `value` into `0..=100`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// The raw value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Add a signed delta, saturating at both bounds.
    #[must_use]
    pub fn adjust(self, delta: i32) -> Self {
        Self::clamped(i64::from(self.0) + i64::from(delta))
    }
}

impl TryFrom<i64> for Stat {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(format!("stat value {} outside 0..=100", value))
        }
    }
}

impl From<Stat> for u8 {
    fn from(stat: Stat) -> Self {
        stat.0
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three well-being stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStats {
    /// How rested the pet is.
    pub energy: Stat,
    /// How fed the pet is (100 means full, not starving).
    pub hunger: Stat,
    /// How content the pet is.
    pub happiness: Stat,
}

impl PetStats {
    /// All three stats at 100.
    pub const FULL: PetStats = PetStats {
        energy: Stat::MAX,
        hunger: Stat::MAX,
        happiness: Stat::MAX,
    };

    /// Build stats from raw values, clamping each into range.
    pub fn clamped(energy: i64, hunger: i64, happiness: i64) -> Self {
        Self {
            energy: Stat::clamped(energy),
            hunger: Stat::clamped(hunger),
            happiness: Stat::clamped(happiness),
        }
    }
}

impl Default for PetStats {
    fn default() -> Self {
        Self::FULL
    }
}

/// Unique identifier assigned to a pet when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(Uuid);

impl PetId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single live pet.
///
/// Field names on the wire keep the historical `emoji` and `lastInteraction`
/// spellings so previously saved slots still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    id: PetId,
    name: String,
    #[serde(rename = "emoji")]
    appearance: String,
    pub(crate) stats: PetStats,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(rename = "lastInteraction", with = "chrono::serde::ts_milliseconds")]
    last_interaction_at: DateTime<Utc>,
}

impl Pet {
    /// Create a new pet with full stats, born at `now`.
    pub fn new(name: impl Into<String>, appearance: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: PetId::new(),
            name: name.into(),
            appearance: appearance.into(),
            stats: PetStats::FULL,
            created_at: now,
            last_interaction_at: now,
        }
    }

    pub fn id(&self) -> PetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn appearance(&self) -> &str {
        &self.appearance
    }

    pub fn stats(&self) -> PetStats {
        self.stats
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_interaction_at(&self) -> DateTime<Utc> {
        self.last_interaction_at
    }

    /// Milliseconds since the last interaction, as seen from `now`.
    ///
    /// Negative if `now` is behind the recorded interaction.
    pub fn millis_since_interaction(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_interaction_at).num_milliseconds()
    }

    /// Record an interaction at `now`; never moves the timestamp backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_interaction_at {
            self.last_interaction_at = now;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_last_interaction_at(&mut self, at: DateTime<Utc>) {
        self.last_interaction_at = at;
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (energy {}, hunger {}, happiness {})",
            self.appearance, self.name, self.stats.energy, self.stats.hunger, self.stats.happiness
        )
    }
}
