//! Headless simulation loop that owns the clock and routes messages.

use std::{collections::VecDeque, fmt, time::Duration};

use anyhow::Context;
use hex_defence_core::{Command, Event, GameOutcome};
use hex_defence_system_economy::{Economy, EconomySnapshot};
use hex_defence_system_waves::{SchedulerPhase, WaveProgress, WaveScheduler};
use hex_defence_world::{self as world, query, World};

use crate::scenario::Scenario;

/// World plus the systems that react to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    economy: Economy,
    next_wave_after: Option<Duration>,
    idle: Duration,
}

impl Simulation {
    /// Loads the scenario into a fresh world and starts the first wave.
    pub(crate) fn new(scenario: &Scenario) -> anyhow::Result<Self> {
        let mut simulation = Self {
            world: World::new(),
            scheduler: WaveScheduler::new(scenario.scheduler_config()),
            economy: Economy::new(scenario.economy_config()),
            next_wave_after: scenario.next_wave_after(),
            idle: Duration::ZERO,
        };

        let _ = simulation.apply(Command::ConfigureExit {
            radius: scenario.exit_radius(),
        });
        for archetype in scenario.archetypes() {
            let _ = simulation.apply(Command::DefineArchetype {
                archetype: *archetype,
            });
        }

        let events = simulation.apply(Command::LoadMap {
            cells: scenario.cells()?,
        });
        let rejection = events.iter().find_map(|event| match event {
            Event::PathRejected { reason } => Some(*reason),
            _ => None,
        });
        if let Some(reason) = rejection {
            return Err(anyhow::Error::new(reason).context("scenario map has no playable path"));
        }

        let mut commands = Vec::new();
        simulation
            .scheduler
            .start(query::spawn_waypoint(&simulation.world), &mut commands)
            .context("failed to start the wave scheduler")?;
        for command in commands {
            let _ = simulation.apply(command);
        }
        Ok(simulation)
    }

    /// Applies a command and every command the systems issue in response.
    ///
    /// Returns the events broadcast along the way, in order.
    pub(crate) fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut broadcast = Vec::new();
        let mut pending = VecDeque::from([command]);
        while let Some(command) = pending.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);

            let mut commands = Vec::new();
            self.scheduler.handle(&events, &mut commands);
            self.economy.handle(&events, &mut commands);
            pending.extend(commands);
            broadcast.extend(events);
        }
        broadcast
    }

    /// Advances the clock by one tick.
    ///
    /// With manual wave advance, a field that stayed clear for the configured
    /// delay triggers a next wave request.
    pub(crate) fn step(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = self.apply(Command::Tick { dt });
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if advanced {
            events.extend(self.request_next_wave(dt));
        }
        events
    }

    fn request_next_wave(&mut self, dt: Duration) -> Vec<Event> {
        let Some(after) = self.next_wave_after else {
            return Vec::new();
        };
        let progress = self.scheduler.progress();
        if progress.phase != SchedulerPhase::AwaitingClear || progress.enemies_alive > 0 {
            self.idle = Duration::ZERO;
            return Vec::new();
        }
        self.idle = self.idle.saturating_add(dt);
        if self.idle < after {
            return Vec::new();
        }
        self.idle = Duration::ZERO;
        tracing::debug!(wave = progress.wave, "requesting the next wave");
        self.apply(Command::RequestNextWave)
    }

    /// Ticks until the game ends or `limit` of simulated time elapsed.
    pub(crate) fn run(&mut self, tick: Duration, limit: Duration) -> Summary {
        let mut wave = 0;
        while query::outcome(&self.world).is_none() && query::elapsed(&self.world) < limit {
            let _ = self.step(tick);
            let progress = self.scheduler.progress();
            if progress.wave != wave {
                wave = progress.wave;
                tracing::info!(
                    wave,
                    of = progress.waves,
                    lives = self.economy.lives(),
                    "simulation reached a new wave"
                );
            }
        }
        if query::outcome(&self.world).is_none() {
            tracing::warn!(?limit, "simulation stopped at the time limit");
        }
        self.summary()
    }

    /// Read access to the world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Final state of the run.
    pub(crate) fn summary(&self) -> Summary {
        Summary {
            outcome: query::outcome(&self.world),
            elapsed: query::elapsed(&self.world),
            progress: self.scheduler.progress(),
            economy: self.economy.snapshot(),
        }
    }
}

/// Outcome and counters reported when a run ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) outcome: Option<GameOutcome>,
    pub(crate) elapsed: Duration,
    pub(crate) progress: WaveProgress,
    pub(crate) economy: EconomySnapshot,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(GameOutcome::Won) => "won",
            Some(GameOutcome::Lost) => "lost",
            None => "unfinished",
        };
        writeln!(f, "Game {outcome} after {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(
            f,
            "Waves: {} / {} ({} survived)",
            self.progress.wave, self.progress.waves, self.economy.stats.waves_survived
        )?;
        writeln!(
            f,
            "Lives: {} / {}",
            self.economy.lives, self.economy.starting_lives
        )?;
        writeln!(f, "Currency: {}", self.economy.currency)?;
        writeln!(f, "Damage dealt: {}", self.economy.stats.damage_dealt)?;
        write!(
            f,
            "Enemies spawned: {}, destroyed: {}, leaked: {}",
            self.economy.stats.enemies_spawned,
            self.economy.stats.enemies_destroyed,
            self.economy.stats.enemies_leaked
        )
    }
}
