//! Enemy lifecycle: health, movement along the route and termination.

use std::time::Duration;

use glam::Vec3;
use hex_defence_core::{EnemyArchetype, EnemyId, TowerId, WaypointId};

use crate::map::HexMap;

/// Health at or below this value counts as dead.
const HEALTH_EPSILON: f32 = 1e-4;

/// Distance under which an enemy counts as standing on its target waypoint.
const ARRIVAL_EPSILON: f32 = 0.01;

/// Time an enemy lingers on an exhausted route before it is removed.
pub(crate) const LEAK_GRACE: Duration = Duration::from_secs(1);

/// Default radius of the trigger volume surrounding the destination.
pub const DEFAULT_EXIT_RADIUS: f32 = 0.25;

/// Lifecycle state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    /// Moving along the route.
    Alive,
    /// Killed, optionally credited to a tower.
    Dead {
        /// Tower credited with the kill.
        killer: Option<TowerId>,
    },
    /// Touched the exit trigger.
    ReachedExit,
}

/// Transition produced when an enemy leaves the alive state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Termination {
    Destroyed { killer: Option<TowerId> },
    ReachedExit,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    archetype: EnemyArchetype,
    health: f32,
    state: EnemyState,
    position: Vec3,
    target: Option<WaypointId>,
    grace: Option<Duration>,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        archetype: EnemyArchetype,
        waypoint: WaypointId,
        position: Vec3,
    ) -> Self {
        Self {
            id,
            archetype,
            health: archetype.starting_health,
            state: EnemyState::Alive,
            position,
            target: Some(waypoint),
            grace: None,
        }
    }

    pub(crate) const fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) const fn archetype(&self) -> &EnemyArchetype {
        &self.archetype
    }

    pub(crate) const fn health(&self) -> f32 {
        self.health
    }

    pub(crate) const fn state(&self) -> EnemyState {
        self.state
    }

    pub(crate) const fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) const fn target(&self) -> Option<WaypointId> {
        self.target
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    /// Subtracts health; reaching zero kills the enemy with `source` as killer.
    pub(crate) fn take_damage(&mut self, amount: f32, source: Option<TowerId>) -> Option<Termination> {
        if !self.is_alive() {
            return None;
        }
        self.health -= amount.max(0.0);
        if self.health <= HEALTH_EPSILON {
            self.health = 0.0;
            return self.kill(source);
        }
        None
    }

    pub(crate) fn kill(&mut self, killer: Option<TowerId>) -> Option<Termination> {
        if !self.is_alive() {
            return None;
        }
        self.state = EnemyState::Dead { killer };
        Some(Termination::Destroyed { killer })
    }

    pub(crate) fn reach_exit(&mut self) -> Option<Termination> {
        if !self.is_alive() {
            return None;
        }
        self.state = EnemyState::ReachedExit;
        Some(Termination::ReachedExit)
    }

    /// Moves the enemy along the route for `dt` of simulated time.
    ///
    /// Surplus travel after reaching a waypoint carries over to the next one.
    /// Once the route is exhausted without touching the exit trigger the
    /// enemy waits out [`LEAK_GRACE`] and is then killed without a killer.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        map: &HexMap,
        exit: Option<(Vec3, f32)>,
    ) -> Option<Termination> {
        if !self.is_alive() {
            return None;
        }

        if let Some(remaining) = self.grace {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                return self.kill(None);
            }
            self.grace = Some(remaining);
            return None;
        }

        let mut travel = self.archetype.speed.max(0.0) * dt.as_secs_f32();
        while let Some(waypoint) = self.target {
            let Some(destination) = map.waypoint_position(waypoint) else {
                self.target = None;
                break;
            };
            let offset = destination - self.position;
            let distance = offset.length();
            if distance - travel > ARRIVAL_EPSILON {
                self.position += offset * (travel / distance);
                break;
            }

            self.position = destination;
            travel = (travel - distance).max(0.0);
            self.target = map.waypoint(waypoint).and_then(|node| node.next());
        }

        if let Some((centre, radius)) = exit {
            if self.position.distance(centre) <= radius {
                return self.reach_exit();
            }
        }

        if self.target.is_none() {
            self.grace = Some(LEAK_GRACE);
        }
        None
    }
}
