#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that paces enemy production against the enemy route.
//!
//! The scheduler is a resumable state object: every [`Event::TimeAdvanced`]
//! spends its duration across as many phases as it covers, so long ticks
//! produce the same commands as many short ones.

use std::{
    collections::{HashSet, VecDeque},
    time::Duration,
};

use hex_defence_core::{
    ArchetypeId, Command, EnemyId, Event, GameOutcome, SectionOrder, WaveConfig, WaypointId,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_WARNING: Duration = Duration::from_secs(2);

/// Reasons the scheduler refuses to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The map has no valid route to spawn enemies on.
    #[error("no spawn waypoint available; the map has no valid path")]
    MissingSpawnWaypoint,
    /// The scheduler already left the idle phase.
    #[error("wave scheduler already started")]
    AlreadyStarted,
}

/// How the scheduler moves on once a wave has cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdvanceMode {
    /// The next wave starts as soon as the battlefield clears.
    #[default]
    Automatic,
    /// The next wave waits for [`Event::NextWaveRequested`].
    Manual,
}

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    warning: Duration,
    start_delay: Duration,
    advance: AdvanceMode,
    wait_for_clear: bool,
    shuffle_seed: u64,
    waves: Vec<WaveConfig>,
}

impl Config {
    /// Creates a configuration that chains the provided waves automatically.
    #[must_use]
    pub fn new(waves: Vec<WaveConfig>) -> Self {
        Self {
            warning: DEFAULT_WARNING,
            start_delay: Duration::ZERO,
            advance: AdvanceMode::Automatic,
            wait_for_clear: true,
            shuffle_seed: 0,
            waves,
        }
    }

    /// Sets the length of the warning window announced before each wave.
    #[must_use]
    pub fn with_warning(mut self, warning: Duration) -> Self {
        self.warning = warning;
        self
    }

    /// Sets the delay observed before each warning window.
    #[must_use]
    pub fn with_start_delay(mut self, start_delay: Duration) -> Self {
        self.start_delay = start_delay;
        self
    }

    /// Selects how the scheduler advances between waves.
    #[must_use]
    pub fn with_advance(mut self, advance: AdvanceMode) -> Self {
        self.advance = advance;
        self
    }

    /// Controls whether a wave must clear before the next one begins.
    #[must_use]
    pub fn with_wait_for_clear(mut self, wait_for_clear: bool) -> Self {
        self.wait_for_clear = wait_for_clear;
        self
    }

    /// Seeds the generator used to shuffle randomised sections.
    #[must_use]
    pub fn with_shuffle_seed(mut self, shuffle_seed: u64) -> Self {
        self.shuffle_seed = shuffle_seed;
        self
    }
}

/// Externally visible phase of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerPhase {
    /// Not started yet.
    Idle,
    /// Waiting out the delay before a warning.
    Delay,
    /// Counting down the warning window.
    WarningCountdown,
    /// Issuing spawn requests for the current wave.
    Spawning,
    /// Waiting for the battlefield to clear.
    AwaitingClear,
    /// Every wave was spawned.
    Finished,
    /// Stopped by the end of the game.
    Halted,
}

/// Read-only progress counters for UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveProgress {
    /// One-based number of the current wave, zero before the first one.
    pub wave: u32,
    /// Number of configured waves.
    pub waves: u32,
    /// Enemies spawned so far in the current wave.
    pub enemies_spawned: u32,
    /// Enemies the current wave spawns in total.
    pub wave_enemy_count: u32,
    /// Enemies currently alive across the whole map.
    pub enemies_alive: u32,
    /// Time left in the warning window.
    pub countdown: Duration,
    /// Reports whether the current wave is spawning.
    pub spawning: bool,
    /// Phase of the scheduler.
    pub phase: SchedulerPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpawnStep {
    Spawn(ArchetypeId),
    Wait(Duration),
}

#[derive(Debug)]
enum Phase {
    Idle,
    Delay { remaining: Duration },
    Warning { remaining: Duration },
    Spawning { steps: VecDeque<SpawnStep> },
    AwaitingClear,
    Finished,
    Halted,
}

/// Pure system that turns wave configuration into timed spawn commands.
#[derive(Debug)]
pub struct WaveScheduler {
    warning: Duration,
    start_delay: Duration,
    advance: AdvanceMode,
    wait_for_clear: bool,
    waves: Vec<WaveConfig>,
    rng: ChaCha8Rng,
    phase: Phase,
    spawn: Option<WaypointId>,
    wave: u32,
    enemies_spawned: u32,
    pending_spawns: u32,
    active: HashSet<EnemyId>,
    victory_reported: bool,
}

impl WaveScheduler {
    /// Creates a new idle scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            warning: config.warning,
            start_delay: config.start_delay,
            advance: config.advance,
            wait_for_clear: config.wait_for_clear,
            waves: config.waves,
            rng: ChaCha8Rng::seed_from_u64(config.shuffle_seed),
            phase: Phase::Idle,
            spawn: None,
            wave: 0,
            enemies_spawned: 0,
            pending_spawns: 0,
            active: HashSet::new(),
            victory_reported: false,
        }
    }

    /// Starts the first wave on the provided spawn waypoint.
    ///
    /// Without a spawn waypoint the scheduler stays idle and reports
    /// [`ScheduleError::MissingSpawnWaypoint`].
    pub fn start(
        &mut self,
        spawn: Option<WaypointId>,
        out: &mut Vec<Command>,
    ) -> Result<(), ScheduleError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(ScheduleError::AlreadyStarted);
        }
        let Some(spawn) = spawn else {
            tracing::error!("no spawn waypoint available, wave scheduler stays idle");
            return Err(ScheduleError::MissingSpawnWaypoint);
        };

        tracing::info!(waves = self.waves.len(), "starting wave scheduler");
        self.spawn = Some(spawn);
        self.begin_next_wave();
        self.run(Duration::ZERO, out);
        Ok(())
    }

    /// Consumes world events and emits wave commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.run(*dt, out),
                Event::EnemySpawned { enemy, .. } => {
                    if self.pending_spawns > 0 {
                        self.pending_spawns -= 1;
                        let _ = self.active.insert(*enemy);
                    }
                }
                Event::EnemySpawnRejected { .. } => {
                    if self.pending_spawns > 0 {
                        self.pending_spawns -= 1;
                        self.run(Duration::ZERO, out);
                    }
                }
                Event::EnemyDestroyed { enemy, .. } | Event::EnemyReachedExit { enemy, .. } => {
                    if self.active.remove(enemy) {
                        self.run(Duration::ZERO, out);
                    }
                }
                Event::NextWaveRequested => self.request_next_wave(out),
                Event::GameOver { outcome, .. } => self.halt(*outcome),
                _ => {}
            }
        }
    }

    /// Captures the counters read by UI collaborators.
    #[must_use]
    pub fn progress(&self) -> WaveProgress {
        let (phase, countdown, spawning) = match &self.phase {
            Phase::Idle => (SchedulerPhase::Idle, Duration::ZERO, false),
            Phase::Delay { .. } => (SchedulerPhase::Delay, Duration::ZERO, false),
            Phase::Warning { remaining } => (SchedulerPhase::WarningCountdown, *remaining, false),
            Phase::Spawning { .. } => (SchedulerPhase::Spawning, Duration::ZERO, true),
            Phase::AwaitingClear => (SchedulerPhase::AwaitingClear, Duration::ZERO, false),
            Phase::Finished => (SchedulerPhase::Finished, Duration::ZERO, false),
            Phase::Halted => (SchedulerPhase::Halted, Duration::ZERO, false),
        };
        WaveProgress {
            wave: self.wave,
            waves: u32::try_from(self.waves.len()).unwrap_or(u32::MAX),
            enemies_spawned: self.enemies_spawned,
            wave_enemy_count: self.current_wave().map_or(0, WaveConfig::enemy_count),
            enemies_alive: self.enemies_alive(),
            countdown,
            spawning,
            phase,
        }
    }

    fn current_wave(&self) -> Option<&WaveConfig> {
        self.waves.get(wave_index(self.wave)?)
    }

    /// Spawn requests still in flight plus enemies still on the map.
    fn enemies_alive(&self) -> u32 {
        let active = u32::try_from(self.active.len()).unwrap_or(u32::MAX);
        self.pending_spawns.saturating_add(active)
    }

    fn has_next_wave(&self) -> bool {
        usize::try_from(self.wave).is_ok_and(|wave| wave < self.waves.len())
    }

    /// Spends `budget` across phases until one of them blocks.
    fn run(&mut self, mut budget: Duration, out: &mut Vec<Command>) {
        loop {
            match &mut self.phase {
                Phase::Idle | Phase::Finished | Phase::Halted => break,
                Phase::AwaitingClear => {
                    if !self.may_leave_clear_gate() || self.advance == AdvanceMode::Manual {
                        break;
                    }
                    self.begin_next_wave();
                }
                Phase::Delay { remaining } => {
                    if *remaining > budget {
                        *remaining -= budget;
                        break;
                    }
                    budget -= *remaining;
                    self.begin_warning(out);
                }
                Phase::Warning { remaining } => {
                    if *remaining > budget {
                        *remaining -= budget;
                        break;
                    }
                    budget -= *remaining;
                    self.begin_spawning(out);
                }
                Phase::Spawning { steps } => match steps.front_mut() {
                    Some(SpawnStep::Wait(remaining)) => {
                        if *remaining > budget {
                            *remaining -= budget;
                            break;
                        }
                        budget -= *remaining;
                        let _ = steps.pop_front();
                    }
                    Some(SpawnStep::Spawn(archetype)) => {
                        let archetype = *archetype;
                        let _ = steps.pop_front();
                        self.spawn_enemy(archetype, out);
                    }
                    None => self.finish_wave(),
                },
            }
        }
        self.report_victory(out);
    }

    fn may_leave_clear_gate(&self) -> bool {
        !self.wait_for_clear || self.enemies_alive() == 0
    }

    fn begin_next_wave(&mut self) {
        self.phase = if self.has_next_wave() {
            Phase::Delay {
                remaining: self.start_delay,
            }
        } else {
            tracing::info!("no waves left to schedule");
            Phase::Finished
        };
    }

    fn begin_warning(&mut self, out: &mut Vec<Command>) {
        self.wave = self.wave.saturating_add(1);
        self.enemies_spawned = 0;
        tracing::info!(wave = self.wave, warning = ?self.warning, "wave incoming");
        out.push(Command::WarnWave {
            wave: self.wave,
            warning: self.warning,
        });
        self.phase = Phase::Warning {
            remaining: self.warning,
        };
    }

    fn begin_spawning(&mut self, out: &mut Vec<Command>) {
        tracing::info!(wave = self.wave, "wave started");
        out.push(Command::StartWave { wave: self.wave });
        let steps = match wave_index(self.wave).and_then(|index| self.waves.get(index)) {
            Some(wave) => plan(wave, &mut self.rng),
            None => VecDeque::new(),
        };
        self.phase = Phase::Spawning { steps };
    }

    fn spawn_enemy(&mut self, archetype: ArchetypeId, out: &mut Vec<Command>) {
        let Some(waypoint) = self.spawn else {
            return;
        };
        self.enemies_spawned = self.enemies_spawned.saturating_add(1);
        self.pending_spawns = self.pending_spawns.saturating_add(1);
        tracing::debug!(
            wave = self.wave,
            archetype = archetype.get(),
            spawned = self.enemies_spawned,
            "requesting spawn"
        );
        out.push(Command::SpawnEnemy {
            archetype,
            waypoint,
        });
    }

    fn finish_wave(&mut self) {
        tracing::info!(
            wave = self.wave,
            spawned = self.enemies_spawned,
            "finished spawning wave"
        );
        self.phase = if self.has_next_wave() {
            Phase::AwaitingClear
        } else {
            tracing::info!("wave scheduler has finished spawning");
            Phase::Finished
        };
    }

    fn request_next_wave(&mut self, out: &mut Vec<Command>) {
        let ready = matches!(self.phase, Phase::AwaitingClear) && self.may_leave_clear_gate();
        if self.advance != AdvanceMode::Manual || !ready {
            tracing::debug!(wave = self.wave, "ignoring next wave request");
            return;
        }
        self.begin_next_wave();
        self.run(Duration::ZERO, out);
    }

    fn halt(&mut self, outcome: GameOutcome) {
        if matches!(self.phase, Phase::Halted) {
            return;
        }
        tracing::info!(?outcome, wave = self.wave, "wave scheduler halted");
        self.phase = Phase::Halted;
    }

    fn report_victory(&mut self, out: &mut Vec<Command>) {
        if self.victory_reported
            || !matches!(self.phase, Phase::Finished)
            || self.enemies_alive() > 0
        {
            return;
        }
        self.victory_reported = true;
        tracing::info!(waves = self.waves.len(), "every wave cleared");
        out.push(Command::EndGame {
            outcome: GameOutcome::Won,
        });
    }
}

/// Position of a one-based wave number in the configured list.
fn wave_index(wave: u32) -> Option<usize> {
    usize::try_from(wave).ok()?.checked_sub(1)
}

/// Expands a wave into spawn and wait steps.
///
/// Each unit is followed by its group's spawn delay except the very last
/// unit of the wave.
fn plan(wave: &WaveConfig, rng: &mut ChaCha8Rng) -> VecDeque<SpawnStep> {
    let mut steps = VecDeque::new();
    for section in &wave.sections {
        if !section.delay.is_zero() {
            steps.push_back(SpawnStep::Wait(section.delay));
        }

        let mut groups: Vec<_> = section.groups.iter().collect();
        if section.order == SectionOrder::Random {
            groups.shuffle(rng);
        }
        for group in groups {
            for _ in 0..group.count {
                steps.push_back(SpawnStep::Spawn(group.archetype));
                if !group.spawn_delay.is_zero() {
                    steps.push_back(SpawnStep::Wait(group.spawn_delay));
                }
            }
        }
    }

    while matches!(steps.back(), Some(SpawnStep::Wait(_))) {
        let _ = steps.pop_back();
    }
    steps
}
