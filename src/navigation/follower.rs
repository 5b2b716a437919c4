//! Path following state for autonomous agents
//!
//! A follower holds a destination tile, the remaining waypoints toward it and
//! a replan timer. It turns the head of its path into a steering intent each
//! frame. Picking a new destination when the path runs out is left to the
//! caller.

use std::collections::VecDeque;

use crate::core::config::NavigationConfig;
use crate::core::types::{TileCoord, Vector2};
use crate::movement::steering::SteeringIntent;

/// Lifecycle of a follower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowerState {
    /// No objective
    Idle,
    /// Objective set, no path yet
    Planning,
    /// Waypoints remain
    Following,
    /// Path used up; waiting for a replan or a new objective
    Arrived,
}

/// What a replan tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplanOutcome {
    NoObjective,
    /// Interval not yet elapsed
    Waiting,
    /// Already standing on the objective
    AtObjective,
    /// New path with this many waypoints
    Planned(usize),
    /// Planner found no path; the previous path is kept
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    objective: Option<TileCoord>,
    path: Option<VecDeque<TileCoord>>,
    recalc_timer: f32,
    interval: f32,
    arrival_tolerance: f32,
    dead_zone: f32,
}

impl Follower {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            objective: None,
            path: None,
            recalc_timer: 0.0,
            interval: config.recalculate_interval,
            arrival_tolerance: config.arrival_tolerance,
            dead_zone: config.dead_zone,
        }
    }

    pub fn objective(&self) -> Option<TileCoord> {
        self.objective
    }

    pub fn path(&self) -> Option<&VecDeque<TileCoord>> {
        self.path.as_ref()
    }

    pub fn recalc_timer(&self) -> f32 {
        self.recalc_timer
    }

    /// Replace the objective, dropping the cached path
    ///
    /// The timer is set to a full interval so the next tick plans at once.
    pub fn set_objective(&mut self, objective: Option<TileCoord>) {
        self.objective = objective;
        self.path = None;
        self.recalc_timer = self.interval;
    }

    pub fn state(&self) -> FollowerState {
        match (&self.objective, &self.path) {
            (None, _) => FollowerState::Idle,
            (Some(_), None) => FollowerState::Planning,
            (Some(_), Some(path)) if path.is_empty() => FollowerState::Arrived,
            (Some(_), Some(_)) => FollowerState::Following,
        }
    }

    /// True once a path was planned and every waypoint was reached
    pub fn is_exhausted(&self) -> bool {
        self.state() == FollowerState::Arrived
    }

    /// Advance the replan timer and, when it elapses, plan from `current`
    ///
    /// `plan` is called with `(current, objective)`. A `None` from it keeps the
    /// stale path.
    pub fn replan<F>(&mut self, dt: f32, current: TileCoord, plan: F) -> ReplanOutcome
    where
        F: FnOnce(TileCoord, TileCoord) -> Option<Vec<TileCoord>>,
    {
        let Some(objective) = self.objective else {
            return ReplanOutcome::NoObjective;
        };

        self.recalc_timer += dt;
        if self.recalc_timer < self.interval {
            return ReplanOutcome::Waiting;
        }
        self.recalc_timer = 0.0;

        if current == objective {
            return ReplanOutcome::AtObjective;
        }

        match plan(current, objective) {
            Some(path) => {
                let len = path.len();
                self.path = Some(path.into());
                ReplanOutcome::Planned(len)
            }
            None => ReplanOutcome::Unreachable,
        }
    }

    /// Steering toward the next waypoint from `position`
    ///
    /// Waypoints within the arrival tolerance are popped first.
    pub fn steer(&mut self, position: Vector2) -> SteeringIntent {
        let Some(path) = self.path.as_mut() else {
            return SteeringIntent::IDLE;
        };

        while let Some(head) = path.front() {
            if position.distance(head.center()) <= self.arrival_tolerance {
                path.pop_front();
            } else {
                break;
            }
        }

        match path.front() {
            Some(head) => SteeringIntent::toward(head.center() - position, self.dead_zone),
            None => SteeringIntent::IDLE,
        }
    }
}
