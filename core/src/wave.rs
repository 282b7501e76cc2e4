//! Author-time description of enemy waves.
//!
//! A wave is an ordered list of sections, a section is an ordered list of
//! enemy groups and a group spawns `count` units of one archetype. The data is
//! immutable once loaded; the wave scheduler only reads it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ArchetypeId;

/// Complete configuration of a single wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Sections spawned one after another.
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl WaveConfig {
    /// Creates a wave from its ordered sections.
    #[must_use]
    pub fn new(sections: Vec<SectionConfig>) -> Self {
        Self { sections }
    }

    /// Total number of enemies spawned across every section of the wave.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.sections.iter().map(SectionConfig::enemy_count).sum()
    }
}

/// Order in which the groups of a section are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionOrder {
    /// Groups spawn in authoring order.
    #[default]
    Sequential,
    /// Groups are shuffled before the section starts.
    Random,
}

/// Slice of a wave that starts after its own delay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Time waited before the first group of the section spawns.
    #[serde(default, with = "seconds")]
    pub delay: Duration,
    /// Visiting order of the groups.
    #[serde(default)]
    pub order: SectionOrder,
    /// Groups spawned by the section.
    #[serde(default)]
    pub groups: Vec<EnemyGroupConfig>,
}

impl SectionConfig {
    /// Creates a sequential section.
    #[must_use]
    pub fn new(delay: Duration, groups: Vec<EnemyGroupConfig>) -> Self {
        Self {
            delay,
            order: SectionOrder::Sequential,
            groups,
        }
    }

    /// Returns the section with a different group order.
    #[must_use]
    pub fn with_order(mut self, order: SectionOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of enemies spawned by the section.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Run of identical enemies spawned at a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyGroupConfig {
    /// Archetype spawned by the group.
    pub archetype: ArchetypeId,
    /// Number of units spawned.
    pub count: u32,
    /// Time waited after each unit before the next one spawns.
    #[serde(with = "seconds")]
    pub spawn_delay: Duration,
}

impl EnemyGroupConfig {
    /// Creates a new group descriptor.
    #[must_use]
    pub const fn new(archetype: ArchetypeId, count: u32, spawn_delay: Duration) -> Self {
        Self {
            archetype,
            count,
            spawn_delay,
        }
    }
}

/// Serde adapter that writes durations as fractional seconds.
pub mod seconds {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serializes a duration as fractional seconds.
    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Deserializes fractional seconds into a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(value).map_err(D::Error::custom)
    }
}
