#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hex Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically within the same tick. The hex
//! coordinate algebra and the author-time wave description live here as well
//! because every other crate speaks in those terms.

mod hex;
mod wave;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use hex::{HexCoordinate, HexDirection, OffsetCoordinate, DIRECTION_COUNT};
pub use wave::{seconds, EnemyGroupConfig, SectionConfig, SectionOrder, WaveConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Hex Defence.";

/// Describes whether simulated time is currently flowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Ticks advance timers, enemies and schedulers.
    #[default]
    Running,
    /// Ticks are swallowed so every timer freezes.
    Paused,
}

/// Final result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every wave was spawned and cleared.
    Won,
    /// The player ran out of lives or the game was abandoned.
    Lost,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the map with the provided cells and rebuilds topology and path.
    LoadMap {
        /// Every cell belonging to the map.
        cells: Vec<CellSpec>,
    },
    /// Retags a single cell and rebuilds topology and path.
    SetCellTags {
        /// Cell being edited.
        coordinates: HexCoordinate,
        /// New terrain tag.
        tile: TileKind,
        /// New pathing role.
        role: PathingRole,
    },
    /// Registers or replaces the statistics of an enemy archetype.
    DefineArchetype {
        /// Archetype description.
        archetype: EnemyArchetype,
    },
    /// Configures the exit trigger surrounding the destination cell.
    ConfigureExit {
        /// Trigger radius in world units, or `None` to disable the trigger.
        radius: Option<f32>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Announces that a wave is about to begin.
    WarnWave {
        /// One-based number of the upcoming wave.
        wave: u32,
        /// Length of the warning window.
        warning: Duration,
    },
    /// Announces that a wave begins spawning.
    StartWave {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Requests that the spawner create an enemy on the path.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        archetype: ArchetypeId,
        /// Waypoint the enemy starts on.
        waypoint: WaypointId,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: f32,
        /// Tower responsible for the damage, if any.
        source: Option<TowerId>,
    },
    /// Kills an enemy outright.
    KillEnemy {
        /// Enemy being killed.
        enemy: EnemyId,
        /// Tower credited with the kill, if any.
        killer: Option<TowerId>,
    },
    /// Reports that an enemy collided with the exit.
    EnemyReachedExit {
        /// Enemy that reached the exit.
        enemy: EnemyId,
    },
    /// Explicit trigger that starts the next wave in manual advance mode.
    RequestNextWave,
    /// Ends the game with the provided outcome.
    EndGame {
        /// Outcome recorded for the game.
        outcome: GameOutcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new map was loaded.
    MapLoaded {
        /// Number of cells in the map.
        cells: usize,
    },
    /// Reports that a valid path was built from spawn to destination.
    PathBuilt {
        /// Waypoint enemies are spawned on.
        spawn: WaypointId,
        /// Final waypoint of the path.
        destination: WaypointId,
        /// Number of linked waypoints.
        waypoints: usize,
    },
    /// Reports that the map cannot be played with its current tags.
    PathRejected {
        /// Reason the path builder gave up.
        reason: PathError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Warns observers that a wave is about to begin.
    WaveWarning {
        /// One-based number of the upcoming wave.
        wave: u32,
        /// Length of the warning window.
        warning: Duration,
    },
    /// Announces that a wave started spawning.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Confirms that an enemy was created on the path.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        archetype: ArchetypeId,
        /// Waypoint the enemy starts on.
        waypoint: WaypointId,
    },
    /// Reports that a spawn request could not be honoured.
    EnemySpawnRejected {
        /// Archetype that was requested.
        archetype: ArchetypeId,
        /// Waypoint that was requested.
        waypoint: WaypointId,
    },
    /// Reports health removed from a live enemy.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Tower that dealt the damage, if any.
        source: Option<TowerId>,
        /// Health removed, rounded to whole points.
        amount: u32,
    },
    /// Reports that an enemy died.
    EnemyDestroyed {
        /// Enemy that died.
        enemy: EnemyId,
        /// Tower credited with the kill, if any.
        killer: Option<TowerId>,
        /// Currency reward carried by the enemy.
        reward: u32,
    },
    /// Reports that an enemy reached the exit alive.
    EnemyReachedExit {
        /// Enemy that leaked.
        enemy: EnemyId,
        /// Lives the enemy takes from the player.
        damage: u32,
    },
    /// Relays an explicit request to start the next wave.
    NextWaveRequested,
    /// Announces the end of the game.
    GameOver {
        /// Result of the game.
        outcome: GameOutcome,
        /// Last wave that started before the game ended.
        wave: u32,
    },
}

/// Terrain tag of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Hidden placeholder cell.
    #[default]
    Empty,
    /// Regular buildable terrain.
    Grass,
    /// Part of the enemy route.
    Path,
    /// Impassable water.
    Water,
}

impl TileKind {
    /// Reports whether the cell belongs to the enemy route.
    #[must_use]
    pub const fn is_path(self) -> bool {
        matches!(self, Self::Path)
    }
}

/// Pathing role of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathingRole {
    /// Ordinary cell.
    #[default]
    Normal,
    /// Start of the enemy route.
    Spawn,
    /// End of the enemy route.
    Destination,
}

/// Authoring description of a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSpec {
    /// Immutable address of the cell.
    pub coordinates: HexCoordinate,
    /// Terrain tag.
    pub tile: TileKind,
    /// Pathing role.
    pub role: PathingRole,
    /// Cosmetic elevation step.
    pub height: i32,
}

impl CellSpec {
    /// Creates a flat cell with the provided tags.
    #[must_use]
    pub const fn new(coordinates: HexCoordinate, tile: TileKind, role: PathingRole) -> Self {
        Self {
            coordinates,
            tile,
            role,
            height: 0,
        }
    }

    /// Returns the cell raised to the provided height.
    #[must_use]
    pub const fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }
}

/// Reasons the path builder refuses a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PathError {
    /// No cell carries the spawn role.
    #[error("no spawn cell found for pathing")]
    MissingSpawn,
    /// More than one cell carries the spawn role.
    #[error("too many spawn cells found for pathing ({count})")]
    MultipleSpawns {
        /// Number of spawn cells found.
        count: usize,
    },
    /// No cell carries the destination role.
    #[error("no destination cell found for pathing")]
    MissingDestination,
    /// More than one cell carries the destination role.
    #[error("too many destination cells found for pathing ({count})")]
    MultipleDestinations {
        /// Number of destination cells found.
        count: usize,
    },
    /// The spawn cell does not sit at the end of a path.
    #[error("spawn cell {cell} must have exactly one path neighbour, found {path_neighbors}")]
    SpawnNotPathEnd {
        /// Spawn cell coordinates.
        cell: HexCoordinate,
        /// Number of path neighbours found.
        path_neighbors: usize,
    },
    /// The destination cell does not sit at the end of a path.
    #[error(
        "destination cell {cell} must have exactly one path neighbour, found {path_neighbors}"
    )]
    DestinationNotPathEnd {
        /// Destination cell coordinates.
        cell: HexCoordinate,
        /// Number of path neighbours found.
        path_neighbors: usize,
    },
    /// A path cell has more than two path neighbours.
    #[error("path cell {cell} branches into {path_neighbors} path neighbours")]
    Branching {
        /// Cell where the path branches.
        cell: HexCoordinate,
        /// Number of path neighbours found.
        path_neighbors: usize,
    },
    /// The walk from the spawn ended somewhere other than the destination.
    #[error("path from the spawn ends at {end} instead of the destination")]
    Disconnected {
        /// Last cell reached by the walk.
        end: HexCoordinate,
    },
    /// The walk exceeded its step budget.
    #[error("path walk exceeded {limit} steps")]
    WalkLimitExceeded {
        /// Step budget that was exhausted.
        limit: usize,
    },
}

/// Statistics shared by every enemy of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    /// Identifier referenced by wave configuration.
    pub id: ArchetypeId,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Lives removed when the enemy reaches the exit.
    pub damage: u32,
    /// Currency granted when the enemy is killed.
    pub reward: u32,
    /// Health the enemy spawns with.
    pub starting_health: f32,
}

impl EnemyArchetype {
    /// Creates a new archetype description.
    #[must_use]
    pub const fn new(
        id: ArchetypeId,
        speed: f32,
        damage: u32,
        reward: u32,
        starting_health: f32,
    ) -> Self {
        Self {
            id,
            speed,
            damage,
            reward,
            starting_health,
        }
    }
}

/// Identifier of an enemy archetype.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Creates a new archetype identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a tower, used to credit kills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a waypoint inside the world's path arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointId(u32);

impl WaypointId {
    /// Creates a new waypoint identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}
