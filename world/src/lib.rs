#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Hex Defence.

mod authoring;
mod enemy;
mod geometry;
mod map;
mod path;
mod topology;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use hex_defence_core::{
    ArchetypeId, Command, EnemyArchetype, EnemyId, Event, GameOutcome, PlayMode, TowerId,
    WaypointId, WELCOME_BANNER,
};

pub use authoring::{generate_grid, parse_layout, LayoutError};
pub use enemy::{EnemyState, DEFAULT_EXIT_RADIUS};
pub use geometry::{cell_position, HEIGHT_MULTIPLIER, INNER_RADIUS, OUTER_RADIUS};
pub use map::{CellId, GridCell, HexMap, Waypoint};
pub use path::MAX_WALK_STEPS;
pub use topology::Topology;

use enemy::{Enemy, Termination};

/// Represents the authoritative Hex Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    map: HexMap,
    archetypes: BTreeMap<ArchetypeId, EnemyArchetype>,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    exit_radius: Option<f32>,
    play_mode: PlayMode,
    wave: u32,
    outcome: Option<GameOutcome>,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a new world with an empty map and no archetypes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            map: HexMap::default(),
            archetypes: BTreeMap::new(),
            enemies: Vec::new(),
            next_enemy_id: 0,
            exit_radius: Some(DEFAULT_EXIT_RADIUS),
            play_mode: PlayMode::Running,
            wave: 0,
            outcome: None,
            tick_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn exit_trigger(&self) -> Option<(Vec3, f32)> {
        let radius = self.exit_radius?;
        let destination = self.map.destination_waypoint()?;
        let centre = self.map.waypoint_position(destination)?;
        Some((centre, radius))
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies
            .binary_search_by_key(&enemy, Enemy::id)
            .ok()
    }

    fn spawn_enemy(&mut self, archetype: ArchetypeId, waypoint: WaypointId) -> Option<EnemyId> {
        if self.is_over() || !self.map.is_on_path(waypoint) {
            return None;
        }
        let stats = *self.archetypes.get(&archetype)?;
        let position = self.map.waypoint_position(waypoint)?;

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies.push(Enemy::spawn(id, stats, waypoint, position));
        Some(id)
    }

    /// Applies damage to one enemy, reporting the health it lost.
    fn damage_enemy(
        &mut self,
        enemy: EnemyId,
        amount: f32,
        source: Option<TowerId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        let target = &mut self.enemies[index];
        let before = target.health();
        let termination = target.take_damage(amount, source);
        let dealt = (before - target.health()).round();
        if dealt >= 1.0 {
            out_events.push(Event::EnemyDamaged {
                enemy,
                source,
                amount: dealt as u32,
            });
        }
        if let Some(termination) = termination {
            let retired = self.enemies.remove(index);
            out_events.push(termination_event(&retired, termination));
        }
    }

    /// Runs a lifecycle transition on one enemy and retires it when it ends.
    fn resolve_enemy(
        &mut self,
        enemy: EnemyId,
        transition: impl FnOnce(&mut Enemy) -> Option<Termination>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        if let Some(termination) = transition(&mut self.enemies[index]) {
            let retired = self.enemies.remove(index);
            out_events.push(termination_event(&retired, termination));
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn termination_event(enemy: &Enemy, termination: Termination) -> Event {
    match termination {
        Termination::Destroyed { killer } => {
            tracing::debug!(enemy = enemy.id().get(), ?killer, "enemy destroyed");
            Event::EnemyDestroyed {
                enemy: enemy.id(),
                killer,
                reward: enemy.archetype().reward,
            }
        }
        Termination::ReachedExit => {
            tracing::debug!(enemy = enemy.id().get(), "enemy reached exit");
            Event::EnemyReachedExit {
                enemy: enemy.id(),
                damage: enemy.archetype().damage,
            }
        }
    }
}

fn push_path_outcome(map: &HexMap, out_events: &mut Vec<Event>) {
    if let Some(reason) = map.path_error() {
        out_events.push(Event::PathRejected { reason });
        return;
    }
    if let (Some(spawn), Some(destination)) = (map.spawn_waypoint(), map.destination_waypoint()) {
        out_events.push(Event::PathBuilt {
            spawn,
            destination,
            waypoints: map.path().len(),
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMap { cells } => {
            world.map = HexMap::from_specs(cells);
            for enemy in world.enemies.iter_mut() {
                if let Some(termination) = enemy.kill(None) {
                    out_events.push(termination_event(enemy, termination));
                }
            }
            world.enemies.clear();
            out_events.push(Event::MapLoaded {
                cells: world.map.cells().len(),
            });
            push_path_outcome(&world.map, out_events);
        }
        Command::SetCellTags {
            coordinates,
            tile,
            role,
        } => {
            if world.map.retag(coordinates, tile, role).is_some() {
                push_path_outcome(&world.map, out_events);
            } else {
                tracing::warn!(%coordinates, "cannot retag a cell outside the map");
            }
        }
        Command::DefineArchetype { archetype } => {
            let _ = world.archetypes.insert(archetype.id, archetype);
        }
        Command::ConfigureExit { radius } => {
            world.exit_radius = radius.filter(|radius| radius.is_finite() && *radius >= 0.0);
        }
        Command::Tick { dt } => {
            if world.is_over() || world.play_mode == PlayMode::Paused {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let exit = world.exit_trigger();
            let map = &world.map;
            let mut retired = Vec::new();
            for enemy in world.enemies.iter_mut() {
                if let Some(termination) = enemy.advance(dt, map, exit) {
                    retired.push(termination_event(enemy, termination));
                }
            }
            world.enemies.retain(Enemy::is_alive);
            out_events.extend(retired);
        }
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                tracing::info!(?mode, "play mode changed");
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::WarnWave { wave, warning } => {
            if !world.is_over() {
                out_events.push(Event::WaveWarning { wave, warning });
            }
        }
        Command::StartWave { wave } => {
            if !world.is_over() {
                world.wave = wave;
                out_events.push(Event::WaveStarted { wave });
            }
        }
        Command::SpawnEnemy {
            archetype,
            waypoint,
        } => match world.spawn_enemy(archetype, waypoint) {
            Some(enemy) => out_events.push(Event::EnemySpawned {
                enemy,
                archetype,
                waypoint,
            }),
            None => {
                tracing::debug!(
                    archetype = archetype.get(),
                    waypoint = waypoint.get(),
                    "spawn request rejected"
                );
                out_events.push(Event::EnemySpawnRejected {
                    archetype,
                    waypoint,
                });
            }
        },
        Command::DamageEnemy {
            enemy,
            amount,
            source,
        } => world.damage_enemy(enemy, amount, source, out_events),
        Command::KillEnemy { enemy, killer } => {
            world.resolve_enemy(enemy, |target| target.kill(killer), out_events);
        }
        Command::EnemyReachedExit { enemy } => {
            world.resolve_enemy(enemy, Enemy::reach_exit, out_events);
        }
        Command::RequestNextWave => {
            if !world.is_over() {
                out_events.push(Event::NextWaveRequested);
            }
        }
        Command::EndGame { outcome } => {
            if world.outcome.is_none() {
                world.outcome = Some(outcome);
                tracing::info!(?outcome, wave = world.wave, "game over");
                out_events.push(Event::GameOver {
                    outcome,
                    wave: world.wave,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec3;
    use hex_defence_core::{
        ArchetypeId, EnemyArchetype, EnemyId, GameOutcome, PlayMode, WaypointId,
    };

    use super::{EnemyState, HexMap, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the hex map.
    #[must_use]
    pub fn map(world: &World) -> &HexMap {
        &world.map
    }

    /// Waypoint enemies spawn on, if the map has a valid route.
    #[must_use]
    pub fn spawn_waypoint(world: &World) -> Option<WaypointId> {
        world.map.spawn_waypoint()
    }

    /// Route waypoints ordered from spawn to destination.
    #[must_use]
    pub fn waypoint_chain(world: &World) -> Vec<WaypointId> {
        world.map.waypoint_chain()
    }

    /// Registered statistics of an archetype.
    #[must_use]
    pub fn archetype(world: &World, id: ArchetypeId) -> Option<&EnemyArchetype> {
        world.archetypes.get(&id)
    }

    /// Radius of the exit trigger, `None` when disabled.
    #[must_use]
    pub fn exit_radius(world: &World) -> Option<f32> {
        world.exit_radius
    }

    /// Play mode currently in effect.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Outcome of the game once it ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<GameOutcome> {
        world.outcome
    }

    /// Number of the last wave that started.
    #[must_use]
    pub fn current_wave(world: &World) -> u32 {
        world.wave
    }

    /// Number of ticks that advanced the simulation.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated time accumulated by unpaused ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a read-only view of the enemies on the map.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id(),
                archetype: enemy.archetype().id,
                health: enemy.health(),
                position: enemy.position(),
                target: enemy.target(),
                state: enemy.state(),
            })
            .collect();
        EnemyView { snapshots }
    }

    /// Read-only snapshot describing every enemy on the map.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots ordered by enemy id.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of enemies captured.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no enemies were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Archetype the enemy was spawned from.
        pub archetype: ArchetypeId,
        /// Remaining health.
        pub health: f32,
        /// World-space position.
        pub position: Vec3,
        /// Waypoint the enemy is heading towards.
        pub target: Option<WaypointId>,
        /// Lifecycle state.
        pub state: EnemyState,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_defence_core::{HexCoordinate, PathError, PathingRole, TileKind, TowerId};

    const RUNNER: ArchetypeId = ArchetypeId::new(1);

    fn loaded_world(rows: &[&str]) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadMap {
                cells: parse_layout(rows).expect("layout"),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DefineArchetype {
                archetype: EnemyArchetype::new(RUNNER, 1.0, 3, 10, 5.0),
            },
            &mut events,
        );
        (world, events)
    }

    fn spawn(world: &mut World) -> EnemyId {
        let waypoint = query::spawn_waypoint(world).expect("spawn waypoint");
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                archetype: RUNNER,
                waypoint,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn new_world_reports_banner() {
        let world = World::new();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::exit_radius(&world), Some(DEFAULT_EXIT_RADIUS));
    }

    #[test]
    fn load_map_reports_cells_and_path() {
        let (world, events) = loaded_world(&["s p d", "g g g"]);
        let chain = query::waypoint_chain(&world);

        assert_eq!(
            events,
            vec![
                Event::MapLoaded { cells: 6 },
                Event::PathBuilt {
                    spawn: chain[0],
                    destination: chain[2],
                    waypoints: 3,
                },
            ]
        );
    }

    #[test]
    fn invalid_map_reports_rejection() {
        let (world, events) = loaded_world(&["p p d"]);
        assert_eq!(
            events,
            vec![
                Event::MapLoaded { cells: 3 },
                Event::PathRejected {
                    reason: PathError::MissingSpawn,
                },
            ]
        );
        assert_eq!(query::spawn_waypoint(&world), None);
    }

    #[test]
    fn retagging_rebuilds_the_route() {
        let (mut world, _) = loaded_world(&["s p p d"]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetCellTags {
                coordinates: HexCoordinate::new(1, 0),
                tile: TileKind::Water,
                role: PathingRole::Normal,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PathRejected {
                reason: PathError::SpawnNotPathEnd {
                    cell: HexCoordinate::new(0, 0),
                    path_neighbors: 0,
                },
            }]
        );

        events.clear();
        apply(
            &mut world,
            Command::SetCellTags {
                coordinates: HexCoordinate::new(9, 9),
                tile: TileKind::Path,
                role: PathingRole::Normal,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn spawn_off_route_or_unknown_archetype_is_rejected() {
        let (mut world, _) = loaded_world(&["s p d", "g g g"]);
        let grass = query::map(&world)
            .cell_at(HexCoordinate::new(0, 1))
            .expect("grass")
            .waypoint();
        let spawn = query::spawn_waypoint(&world).expect("spawn");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: RUNNER,
                waypoint: grass,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: ArchetypeId::new(99),
                waypoint: spawn,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: RUNNER,
                waypoint: WaypointId::new(1_000),
            },
            &mut events,
        );

        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::EnemySpawnRejected { .. })));
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn spawned_enemy_starts_on_spawn_waypoint() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let enemy = spawn(&mut world);

        let view = query::enemy_view(&world).into_vec();
        let spawn = query::spawn_waypoint(&world).expect("spawn");
        let expected = query::map(&world).waypoint_position(spawn).expect("position");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, enemy);
        assert_eq!(view[0].position, expected);
        assert_eq!(view[0].health, 5.0);
        assert_eq!(view[0].state, EnemyState::Alive);
    }

    #[test]
    fn kill_is_reported_once() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let enemy = spawn(&mut world);
        let tower = Some(TowerId::new(3));
        let mut events = Vec::new();

        apply(&mut world, Command::KillEnemy { enemy, killer: tower }, &mut events);
        apply(&mut world, Command::KillEnemy { enemy, killer: tower }, &mut events);
        apply(&mut world, Command::EnemyReachedExit { enemy }, &mut events);

        assert_eq!(
            events,
            vec![Event::EnemyDestroyed {
                enemy,
                killer: tower,
                reward: 10,
            }]
        );
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn lethal_damage_destroys_enemy() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let enemy = spawn(&mut world);
        let mut events = Vec::new();

        for _ in 0..3 {
            apply(
                &mut world,
                Command::DamageEnemy {
                    enemy,
                    amount: 2.0,
                    source: None,
                },
                &mut events,
            );
        }

        let tower = Some(TowerId::new(7));
        assert_eq!(
            events,
            vec![
                Event::EnemyDamaged {
                    enemy,
                    source: None,
                    amount: 2,
                },
                Event::EnemyDamaged {
                    enemy,
                    source: None,
                    amount: 2,
                },
                Event::EnemyDamaged {
                    enemy,
                    source: None,
                    amount: 1,
                },
                Event::EnemyDestroyed {
                    enemy,
                    killer: None,
                    reward: 10,
                },
            ]
        );

        events.clear();
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy,
                amount: 2.0,
                source: tower,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn reloading_the_map_destroys_enemies_without_a_killer() {
        let (mut world, _) = loaded_world(&["s p p p d"]);
        let first = spawn(&mut world);
        let second = spawn(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::LoadMap {
                cells: parse_layout(&["s p d"]).expect("layout"),
            },
            &mut events,
        );

        assert_eq!(
            &events[..2],
            &[
                Event::EnemyDestroyed {
                    enemy: first,
                    killer: None,
                    reward: 10,
                },
                Event::EnemyDestroyed {
                    enemy: second,
                    killer: None,
                    reward: 10,
                },
            ]
        );
        assert_eq!(events[2], Event::MapLoaded { cells: 3 });
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn walking_enemy_leaks_through_exit() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let enemy = spawn(&mut world);
        let mut events = Vec::new();

        for _ in 0..5 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }

        let leaks: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedExit { .. }))
            .collect();
        assert_eq!(leaks, vec![&Event::EnemyReachedExit { enemy, damage: 3 }]);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn disabled_exit_trigger_falls_back_to_grace_timer() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let mut events = Vec::new();
        apply(&mut world, Command::ConfigureExit { radius: None }, &mut events);
        let enemy = spawn(&mut world);

        for _ in 0..12 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(500),
                },
                &mut events,
            );
        }

        assert!(events.contains(&Event::EnemyDestroyed {
            enemy,
            killer: None,
            reward: 10,
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyReachedExit { .. })));
    }

    #[test]
    fn paused_world_swallows_ticks() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Paused,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Paused,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlayModeChanged {
                mode: PlayMode::Paused,
            }]
        );
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::elapsed(&world), Duration::ZERO);
    }

    #[test]
    fn game_over_is_recorded_once_and_freezes_the_world() {
        let (mut world, _) = loaded_world(&["s p d"]);
        let mut events = Vec::new();

        apply(&mut world, Command::StartWave { wave: 2 }, &mut events);
        apply(
            &mut world,
            Command::EndGame {
                outcome: GameOutcome::Lost,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::EndGame {
                outcome: GameOutcome::Won,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(&mut world, Command::RequestNextWave, &mut events);

        assert_eq!(
            events,
            vec![
                Event::WaveStarted { wave: 2 },
                Event::GameOver {
                    outcome: GameOutcome::Lost,
                    wave: 2,
                },
            ]
        );
        assert_eq!(query::outcome(&world), Some(GameOutcome::Lost));

        events.clear();
        let waypoint = query::spawn_waypoint(&world).expect("spawn");
        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: RUNNER,
                waypoint,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EnemySpawnRejected {
                archetype: RUNNER,
                waypoint,
            }]
        );
    }
}
