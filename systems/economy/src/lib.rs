#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player economy: lives, currency and the lose condition.

use hex_defence_core::{Command, Event, GameOutcome};

/// Errors raised by economy operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// The player cannot afford the requested amount.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Amount that was requested.
        required: u32,
        /// Currency held by the player.
        available: u32,
    },
}

/// Configuration parameters required to construct the economy system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    starting_lives: u32,
    starting_currency: u32,
}

impl Config {
    /// Creates a new configuration with the provided starting values.
    #[must_use]
    pub const fn new(starting_lives: u32, starting_currency: u32) -> Self {
        Self {
            starting_lives,
            starting_currency,
        }
    }
}

/// Running statistics gathered over a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EconomyStats {
    /// Enemies that died, with or without a killer.
    pub enemies_destroyed: u32,
    /// Enemies that reached the exit.
    pub enemies_leaked: u32,
    /// Enemies that entered the map.
    pub enemies_spawned: u32,
    /// Health removed from enemies, in whole points.
    pub damage_dealt: u32,
    /// Waves the player outlived; a won game counts its last wave.
    pub waves_survived: u32,
    /// Currency granted through kill rewards.
    pub currency_earned: u32,
    /// Currency spent by the player.
    pub currency_spent: u32,
    /// Number of the last wave that started.
    pub round: u32,
}

/// Read-only economy state for UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EconomySnapshot {
    /// Lives left.
    pub lives: u32,
    /// Lives the player started with.
    pub starting_lives: u32,
    /// Currency held.
    pub currency: u32,
    /// Statistics gathered so far.
    pub stats: EconomyStats,
}

/// Pure system that tracks lives and currency from enemy outcomes.
#[derive(Debug)]
pub struct Economy {
    starting_lives: u32,
    lives: u32,
    currency: u32,
    stats: EconomyStats,
    game_over: bool,
}

impl Economy {
    /// Creates a new economy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            starting_lives: config.starting_lives,
            lives: config.starting_lives,
            currency: config.starting_currency,
            stats: EconomyStats::default(),
            game_over: false,
        }
    }

    /// Consumes world events and emits the lose command when lives run out.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EnemyDestroyed { killer, reward, .. } => {
                    self.stats.enemies_destroyed = self.stats.enemies_destroyed.saturating_add(1);
                    if killer.is_some() {
                        self.earn(*reward);
                    }
                }
                Event::EnemyReachedExit { damage, .. } => {
                    self.stats.enemies_leaked = self.stats.enemies_leaked.saturating_add(1);
                    self.lose_lives(*damage, out);
                }
                Event::EnemySpawned { .. } => {
                    self.stats.enemies_spawned = self.stats.enemies_spawned.saturating_add(1);
                }
                Event::EnemyDamaged { amount, .. } => {
                    self.stats.damage_dealt = self.stats.damage_dealt.saturating_add(*amount);
                }
                Event::WaveStarted { wave } => {
                    self.stats.round = *wave;
                    self.stats.waves_survived = wave.saturating_sub(1);
                }
                Event::GameOver { outcome, wave } => {
                    self.game_over = true;
                    if *outcome == GameOutcome::Won {
                        self.stats.waves_survived = *wave;
                    }
                }
                _ => {}
            }
        }
    }

    /// Removes `amount` from the player's currency.
    ///
    /// Returns the remaining balance.
    pub fn spend(&mut self, amount: u32) -> Result<u32, EconomyError> {
        if amount > self.currency {
            return Err(EconomyError::InsufficientFunds {
                required: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        self.stats.currency_spent = self.stats.currency_spent.saturating_add(amount);
        tracing::debug!(amount, balance = self.currency, "currency spent");
        Ok(self.currency)
    }

    /// Lives left.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Currency held.
    #[must_use]
    pub const fn currency(&self) -> u32 {
        self.currency
    }

    /// Captures the state read by UI collaborators.
    #[must_use]
    pub const fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            lives: self.lives,
            starting_lives: self.starting_lives,
            currency: self.currency,
            stats: self.stats,
        }
    }

    fn earn(&mut self, reward: u32) {
        if reward == 0 {
            return;
        }
        self.currency = self.currency.saturating_add(reward);
        self.stats.currency_earned = self.stats.currency_earned.saturating_add(reward);
        tracing::debug!(reward, balance = self.currency, "currency earned");
    }

    fn lose_lives(&mut self, damage: u32, out: &mut Vec<Command>) {
        if self.lives == 0 || damage == 0 {
            return;
        }
        self.lives = self.lives.saturating_sub(damage);
        tracing::info!(lives = self.lives, damage, "lives lost");

        if self.lives == 0 && !self.game_over {
            self.game_over = true;
            tracing::info!(round = self.stats.round, "player ran out of lives");
            out.push(Command::EndGame {
                outcome: GameOutcome::Lost,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_defence_core::{ArchetypeId, EnemyId, TowerId, WaypointId};

    fn destroyed(killer: Option<TowerId>, reward: u32) -> Event {
        Event::EnemyDestroyed {
            enemy: EnemyId::new(0),
            killer,
            reward,
        }
    }

    fn leaked(damage: u32) -> Event {
        Event::EnemyReachedExit {
            enemy: EnemyId::new(0),
            damage,
        }
    }

    #[test]
    fn kills_with_a_killer_pay_the_reward() {
        let mut economy = Economy::new(Config::new(10, 50));
        let mut commands = Vec::new();

        economy.handle(
            &[destroyed(Some(TowerId::new(1)), 15), destroyed(None, 15)],
            &mut commands,
        );

        let snapshot = economy.snapshot();
        assert_eq!(snapshot.currency, 65);
        assert_eq!(snapshot.stats.currency_earned, 15);
        assert_eq!(snapshot.stats.enemies_destroyed, 2);
        assert!(commands.is_empty());
    }

    #[test]
    fn spending_checks_the_balance() {
        let mut economy = Economy::new(Config::new(10, 50));

        assert_eq!(economy.spend(20), Ok(30));
        assert_eq!(
            economy.spend(31),
            Err(EconomyError::InsufficientFunds {
                required: 31,
                available: 30,
            })
        );
        assert_eq!(economy.currency(), 30);
        assert_eq!(economy.snapshot().stats.currency_spent, 20);
    }

    #[test]
    fn running_out_of_lives_ends_the_game_once() {
        let mut economy = Economy::new(Config::new(3, 0));
        let mut commands = Vec::new();

        economy.handle(&[leaked(2), leaked(2), leaked(2)], &mut commands);

        assert_eq!(economy.lives(), 0);
        assert_eq!(economy.snapshot().stats.enemies_leaked, 3);
        assert_eq!(
            commands,
            vec![Command::EndGame {
                outcome: GameOutcome::Lost,
            }]
        );
    }

    #[test]
    fn round_follows_wave_start() {
        let mut economy = Economy::new(Config::new(1, 0));
        let mut commands = Vec::new();
        economy.handle(&[Event::WaveStarted { wave: 4 }], &mut commands);
        assert_eq!(economy.snapshot().stats.round, 4);
        assert_eq!(economy.snapshot().stats.waves_survived, 3);
    }

    #[test]
    fn spawns_damage_and_survived_waves_are_counted() {
        let mut economy = Economy::new(Config::new(5, 0));
        let mut commands = Vec::new();
        let enemy = EnemyId::new(0);

        economy.handle(
            &[
                Event::WaveStarted { wave: 1 },
                Event::EnemySpawned {
                    enemy,
                    archetype: ArchetypeId::new(1),
                    waypoint: WaypointId::new(0),
                },
                Event::EnemyDamaged {
                    enemy,
                    source: Some(TowerId::new(2)),
                    amount: 4,
                },
                Event::EnemyDamaged {
                    enemy,
                    source: None,
                    amount: 3,
                },
                Event::WaveStarted { wave: 2 },
            ],
            &mut commands,
        );
        let stats = economy.snapshot().stats;
        assert_eq!(stats.enemies_spawned, 1);
        assert_eq!(stats.damage_dealt, 7);
        assert_eq!(stats.waves_survived, 1);

        economy.handle(
            &[Event::GameOver {
                outcome: GameOutcome::Won,
                wave: 2,
            }],
            &mut commands,
        );
        assert_eq!(economy.snapshot().stats.waves_survived, 2);
    }

    #[test]
    fn lost_game_does_not_count_the_last_wave() {
        let mut economy = Economy::new(Config::new(1, 0));
        let mut commands = Vec::new();

        economy.handle(&[Event::WaveStarted { wave: 3 }, leaked(1)], &mut commands);
        economy.handle(
            &[Event::GameOver {
                outcome: GameOutcome::Lost,
                wave: 3,
            }],
            &mut commands,
        );
        assert_eq!(economy.snapshot().stats.waves_survived, 2);
    }

    #[test]
    fn no_defeat_after_the_game_ended() {
        let mut economy = Economy::new(Config::new(1, 0));
        let mut commands = Vec::new();

        economy.handle(
            &[
                Event::GameOver {
                    outcome: GameOutcome::Won,
                    wave: 2,
                },
                leaked(1),
            ],
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
