//! TOML scenario files describing a map, its enemies and its waves.

use std::{collections::BTreeSet, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use hex_defence_core::{seconds, CellSpec, EnemyArchetype, WaveConfig};
use hex_defence_system_economy as economy;
use hex_defence_system_waves as waves;
use hex_defence_world::{parse_layout, DEFAULT_EXIT_RADIUS};
use serde::{de::Error, Deserialize, Deserializer};

const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.toml");

/// Complete description of a playable scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    layout: Vec<String>,
    #[serde(default = "enabled")]
    exit_trigger: bool,
    #[serde(default = "default_exit_radius")]
    exit_radius: f32,
    #[serde(default)]
    scheduler: SchedulerSection,
    #[serde(default)]
    economy: EconomySection,
    #[serde(default)]
    archetypes: Vec<EnemyArchetype>,
    #[serde(default)]
    waves: Vec<WaveConfig>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AdvanceSetting {
    #[default]
    Automatic,
    Manual,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerSection {
    #[serde(default = "default_warning", with = "seconds")]
    warning: Duration,
    #[serde(default, with = "seconds")]
    start_delay: Duration,
    #[serde(default)]
    advance: AdvanceSetting,
    #[serde(default = "enabled")]
    wait_for_clear: bool,
    #[serde(default)]
    shuffle_seed: u64,
    #[serde(default, deserialize_with = "optional_seconds")]
    next_wave_after: Option<Duration>,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            start_delay: Duration::ZERO,
            advance: AdvanceSetting::Automatic,
            wait_for_clear: true,
            shuffle_seed: 0,
            next_wave_after: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EconomySection {
    #[serde(default = "default_lives")]
    starting_lives: u32,
    #[serde(default)]
    starting_currency: u32,
}

impl Default for EconomySection {
    fn default() -> Self {
        Self {
            starting_lives: default_lives(),
            starting_currency: 0,
        }
    }
}

fn optional_seconds<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(|value| Duration::try_from_secs_f64(value).map_err(D::Error::custom))
        .transpose()
}

fn enabled() -> bool {
    true
}

fn default_exit_radius() -> f32 {
    DEFAULT_EXIT_RADIUS
}

fn default_warning() -> Duration {
    Duration::from_secs(2)
}

fn default_lives() -> u32 {
    20
}

impl Scenario {
    /// Parses and validates a scenario from TOML text.
    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        let scenario: Self = toml::from_str(text).context("failed to parse scenario TOML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads a scenario file from disk.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Scenario bundled with the binary.
    pub(crate) fn demo() -> anyhow::Result<Self> {
        Self::parse(DEMO_SCENARIO).context("built-in demo scenario is invalid")
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.exit_radius.is_finite() || self.exit_radius < 0.0 {
            bail!("exit radius must be a non-negative number, got {}", self.exit_radius);
        }

        match (self.scheduler.advance, self.scheduler.next_wave_after) {
            (AdvanceSetting::Manual, None) => {
                bail!("manual wave advance needs `next_wave_after` in [scheduler]")
            }
            (AdvanceSetting::Automatic, Some(_)) => {
                bail!("`next_wave_after` only applies to manual wave advance")
            }
            _ => {}
        }

        let defined: BTreeSet<_> = self.archetypes.iter().map(|archetype| archetype.id).collect();
        for (index, wave) in self.waves.iter().enumerate() {
            let groups = wave.sections.iter().flat_map(|section| section.groups.iter());
            for group in groups {
                if !defined.contains(&group.archetype) {
                    bail!(
                        "wave {} references undefined archetype {}",
                        index + 1,
                        group.archetype.get()
                    );
                }
            }
        }
        Ok(())
    }

    /// Cells decoded from the text layout.
    pub(crate) fn cells(&self) -> anyhow::Result<Vec<CellSpec>> {
        parse_layout(self.layout.as_slice()).context("invalid scenario layout")
    }

    /// Radius of the exit trigger, `None` when disabled.
    pub(crate) fn exit_radius(&self) -> Option<f32> {
        self.exit_trigger.then_some(self.exit_radius)
    }

    /// Archetypes registered before the map loads.
    pub(crate) fn archetypes(&self) -> &[EnemyArchetype] {
        &self.archetypes
    }

    /// Configuration handed to the wave scheduler.
    pub(crate) fn scheduler_config(&self) -> waves::Config {
        let advance = match self.scheduler.advance {
            AdvanceSetting::Automatic => waves::AdvanceMode::Automatic,
            AdvanceSetting::Manual => waves::AdvanceMode::Manual,
        };
        waves::Config::new(self.waves.clone())
            .with_warning(self.scheduler.warning)
            .with_start_delay(self.scheduler.start_delay)
            .with_advance(advance)
            .with_wait_for_clear(self.scheduler.wait_for_clear)
            .with_shuffle_seed(self.scheduler.shuffle_seed)
    }

    /// Idle time in a cleared field before the runner asks for the next wave.
    pub(crate) fn next_wave_after(&self) -> Option<Duration> {
        self.scheduler.next_wave_after
    }

    /// Configuration handed to the economy.
    pub(crate) fn economy_config(&self) -> economy::Config {
        economy::Config::new(self.economy.starting_lives, self.economy.starting_currency)
    }
}
