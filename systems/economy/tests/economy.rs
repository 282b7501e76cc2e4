use std::{collections::VecDeque, time::Duration};

use hex_defence_core::{ArchetypeId, Command, EnemyArchetype, Event, GameOutcome, TowerId};
use hex_defence_system_economy::{Config, Economy};
use hex_defence_world::{self as world, parse_layout, query, World};

const RUNNER: ArchetypeId = ArchetypeId::new(1);

fn apply(world: &mut World, economy: &mut Economy, command: Command, log: &mut Vec<Event>) {
    let mut pending = VecDeque::from([command]);
    while let Some(command) = pending.pop_front() {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        let mut commands = Vec::new();
        economy.handle(&events, &mut commands);
        log.extend(events);
        pending.extend(commands);
    }
}

fn setup(speed: f32, damage: u32) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadMap {
            cells: parse_layout(&["s p p d"]).expect("layout"),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::DefineArchetype {
            archetype: EnemyArchetype::new(RUNNER, speed, damage, 25, 10.0),
        },
        &mut events,
    );
    (world, events)
}

fn spawn(world: &mut World, economy: &mut Economy, log: &mut Vec<Event>) {
    let waypoint = query::spawn_waypoint(world).expect("spawn waypoint");
    apply(
        world,
        economy,
        Command::SpawnEnemy {
            archetype: RUNNER,
            waypoint,
        },
        log,
    );
}

#[test]
fn tower_kills_pay_rewards() {
    let (mut world, _) = setup(0.0, 1);
    let mut economy = Economy::new(Config::new(5, 0));
    let mut log = Vec::new();

    spawn(&mut world, &mut economy, &mut log);
    let enemy = query::enemy_view(&world)
        .iter()
        .next()
        .map(|snapshot| snapshot.id)
        .expect("enemy");
    apply(
        &mut world,
        &mut economy,
        Command::DamageEnemy {
            enemy,
            amount: 10.0,
            source: Some(TowerId::new(4)),
        },
        &mut log,
    );

    assert_eq!(economy.currency(), 25);
    assert_eq!(economy.lives(), 5);
    let stats = economy.snapshot().stats;
    assert_eq!(stats.enemies_spawned, 1);
    assert_eq!(stats.damage_dealt, 10);
}

#[test]
fn leaks_drain_lives_until_the_game_is_lost() {
    let (mut world, _) = setup(10.0, 2);
    let mut economy = Economy::new(Config::new(3, 0));
    let mut log = Vec::new();

    for _ in 0..3 {
        spawn(&mut world, &mut economy, &mut log);
    }
    for _ in 0..10 {
        apply(
            &mut world,
            &mut economy,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut log,
        );
    }

    let game_overs: Vec<_> = log
        .iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .collect();
    assert_eq!(
        game_overs,
        vec![&Event::GameOver {
            outcome: GameOutcome::Lost,
            wave: 0,
        }]
    );
    assert_eq!(economy.lives(), 0);
    assert_eq!(query::outcome(&world), Some(GameOutcome::Lost));
}

#[test]
fn grace_timer_leaks_pay_nothing() {
    let (mut world, _) = setup(50.0, 1);
    let mut economy = Economy::new(Config::new(5, 0));
    let mut log = Vec::new();
    apply(
        &mut world,
        &mut economy,
        Command::ConfigureExit { radius: None },
        &mut log,
    );

    spawn(&mut world, &mut economy, &mut log);
    for _ in 0..4 {
        apply(
            &mut world,
            &mut economy,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut log,
        );
    }

    assert_eq!(economy.snapshot().stats.enemies_destroyed, 1);
    assert_eq!(economy.currency(), 0);
    assert_eq!(economy.lives(), 5);
}
