//! Frame system - orchestrates one simulation update
//!
//! Order within a frame:
//! render area -> streamer -> follower replanning -> velocity and collision
//! -> camera pursuit
//!
//! Nothing here fails. Planning failures fall back to a fresh destination and
//! a missing viewport skips streaming and pursuit.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Vector2};
use crate::movement::collision::{collect_obstacles, resolve_against, Movement};
use crate::movement::entity::MovingEntity;
use crate::movement::steering::SteeringIntent;
use crate::navigation::follower::ReplanOutcome;
use crate::navigation::pathfinding::{find_path, random_free_tile};
use crate::render::streamer::{RenderArea, TilePresenter};
use crate::simulation::context::Simulation;
use crate::spatial::collidable::Collidable;
use crate::world::tile::Tile;

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    /// Successful path plans
    pub replans: usize,
    /// Plans that found no route
    pub failed_plans: usize,
    /// Fresh destinations handed to agents
    pub objectives_assigned: usize,
    pub tiles_spawned: usize,
    pub tiles_evicted: usize,
    /// Entities stopped by an obstacle on either axis
    pub collisions: usize,
    pub player_position: Vector2,
    pub camera_position: Vector2,
}

impl FrameReport {
    /// Add another frame's counters; positions take the later frame's values
    pub fn accumulate(&mut self, other: &FrameReport) {
        self.frame = other.frame;
        self.replans += other.replans;
        self.failed_plans += other.failed_plans;
        self.objectives_assigned += other.objectives_assigned;
        self.tiles_spawned += other.tiles_spawned;
        self.tiles_evicted += other.tiles_evicted;
        self.collisions += other.collisions;
        self.player_position = other.player_position;
        self.camera_position = other.camera_position;
    }
}

/// Advance the simulation by `dt` seconds
///
/// `player_intent` steers every input-controlled entity.
pub fn run_frame<P: TilePresenter>(
    sim: &mut Simulation,
    dt: f32,
    player_intent: SteeringIntent,
    presenter: &mut P,
) -> FrameReport {
    let mut report = FrameReport {
        frame: sim.frame,
        ..FrameReport::default()
    };

    update_streaming(sim, presenter, &mut report);
    replan_followers(sim, dt, &mut report);
    move_entities(sim, dt, player_intent, &mut report);
    pursue_player(sim, dt);

    sim.frame += 1;
    sim.elapsed += dt;

    report.camera_position = sim.camera.position;
    if let Ok(player) = sim.player() {
        report.player_position = player.position;
    }
    report
}

/// Apply the render area around the camera
fn update_streaming<P: TilePresenter>(sim: &mut Simulation, presenter: &mut P, report: &mut FrameReport) {
    let Some(viewport) = sim.camera.viewport else {
        return;
    };
    let area = RenderArea::around(sim.camera.position, &viewport, sim.config.streaming.margin);
    let delta = sim.streamer.update_render_area(area, Some(&sim.world), presenter);
    report.tiles_spawned += delta.spawned;
    report.tiles_evicted += delta.evicted;
}

/// Tick every follower's replan timer and give stuck agents a new destination
fn replan_followers(sim: &mut Simulation, dt: f32, report: &mut FrameReport) {
    let Simulation {
        config,
        world,
        entities,
        rng,
        ..
    } = sim;
    let world = &*world;
    let weight = config.navigation.heuristic_weight;

    for i in 0..entities.len() {
        let (before, rest) = entities.split_at_mut(i);
        let Some((entity, after)) = rest.split_first_mut() else {
            continue;
        };
        let requester = entity.id;
        let current = entity.tile();
        let Some(follower) = entity.follower_mut() else {
            continue;
        };

        let others = before.iter().chain(after.iter());
        let outcome = follower.replan(dt, current, |from, to| {
            find_path(world, from, to, requester, others, weight)
        });

        let reassign = match outcome {
            ReplanOutcome::Planned(len) => {
                report.replans += 1;
                tracing::debug!("{} replanned {} -> {:?}: {} steps", requester, current, follower.objective(), len);
                false
            }
            ReplanOutcome::Unreachable => {
                report.failed_plans += 1;
                true
            }
            ReplanOutcome::NoObjective | ReplanOutcome::AtObjective => true,
            ReplanOutcome::Waiting => false,
        };

        if reassign {
            let objective = random_free_tile(world, rng);
            tracing::debug!("{} reassigned from {:?} to {:?} ({:?})", requester, follower.objective(), objective, outcome);
            follower.set_objective(objective);
            report.objectives_assigned += 1;
        }
    }
}

/// Steer, accelerate and resolve collisions for every entity in order
fn move_entities(sim: &mut Simulation, dt: f32, player_intent: SteeringIntent, report: &mut FrameReport) {
    for i in 0..sim.entities.len() {
        let intent = steering_for(sim, i, player_intent, report);
        let entity = &mut sim.entities[i];
        entity.update_velocity(intent, dt);

        let resolved = {
            let entity = &sim.entities[i];
            let tiles = solid_tiles_in_sweep(sim, entity, dt);
            let others = sim
                .entities
                .iter()
                .map(|e| e as &dyn Collidable)
                .chain(tiles.iter().map(|t| t as &dyn Collidable));
            let obstacles = collect_obstacles(entity, &entity.behavior.collides_with, others);
            resolve_against(
                entity,
                Movement {
                    position: entity.position,
                    velocity: entity.velocity,
                },
                &obstacles,
                dt,
            )
        };

        if resolved.collided() {
            report.collisions += 1;
        }
        sim.entities[i].apply(&resolved);
    }
}

/// Intent for entity `i`: the player's input or its follower's next waypoint
fn steering_for(
    sim: &mut Simulation,
    i: usize,
    player_intent: SteeringIntent,
    report: &mut FrameReport,
) -> SteeringIntent {
    let Simulation { world, entities, rng, .. } = sim;
    let world = &*world;
    let entity = &mut entities[i];
    let id: EntityId = entity.id;
    let center = entity.hitbox_center();

    let Some(follower) = entity.follower_mut() else {
        return player_intent;
    };

    let intent = follower.steer(center);
    if follower.is_exhausted() {
        let objective = random_free_tile(world, rng);
        tracing::debug!("{} reached the end of its path, next objective {:?}", id, objective);
        follower.set_objective(objective);
        report.objectives_assigned += 1;
    }
    intent
}

/// Rock tiles that could touch `entity` anywhere along this frame's motion
fn solid_tiles_in_sweep(sim: &Simulation, entity: &MovingEntity, dt: f32) -> Vec<Tile> {
    let from = entity.bounds();
    let to = entity.bounds_at(Some(entity.position + entity.velocity * dt.max(0.0)));
    sim.world.solid_tiles_near(&from.union(&to))
}

/// Camera chases the player
fn pursue_player(sim: &mut Simulation, dt: f32) {
    if sim.camera.viewport.is_none() {
        return;
    }
    let Ok(target) = sim.player().map(|p| p.position) else {
        return;
    };
    sim.camera.pursue(target, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::TileCoord;
    use crate::render::streamer::NullPresenter;
    use crate::world::grid::WorldGrid;

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default(), WorldGrid::open(40, 40), TileCoord::new(20, 20)).unwrap()
    }

    #[test]
    fn test_first_frame_streams_tiles() {
        let mut sim = sim();
        let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
        assert!(report.tiles_spawned > 0);
        assert_eq!(report.tiles_spawned, sim.streamer.len());
        assert_eq!(report.frame, 0);
        assert_eq!(sim.frame, 1);
    }

    #[test]
    fn test_idle_player_stays_put() {
        let mut sim = sim();
        let start = sim.player().unwrap().position;
        for _ in 0..30 {
            run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
        }
        assert_eq!(sim.player().unwrap().position, start);
    }

    #[test]
    fn test_player_intent_moves_player_and_camera_follows() {
        let mut sim = sim();
        let start = sim.player().unwrap().position;
        let right = SteeringIntent::new(false, true, false, false);
        for _ in 0..60 {
            run_frame(&mut sim, 1.0 / 60.0, right, &mut NullPresenter);
        }
        let player = sim.player().unwrap().position;
        assert!(player.x > start.x + 5.0);
        assert!(sim.camera.position.x > start.x);
        assert!(sim.camera.position.x <= player.x);
    }

    #[test]
    fn test_agents_replan_on_first_frame() {
        let mut sim = sim();
        sim.spawn_agent(TileCoord::new(5, 5)).unwrap();
        let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
        assert!(report.replans + report.objectives_assigned >= 1);
    }

    #[test]
    fn test_agent_without_objective_gets_one() {
        let mut sim = sim();
        let id = sim.spawn_agent(TileCoord::new(5, 5)).unwrap();
        sim.set_objective(id, None).unwrap();

        let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);

        assert!(report.objectives_assigned >= 1);
        let follower = sim.entity(id).unwrap().follower().unwrap();
        assert!(follower.objective().is_some());
    }

    #[test]
    fn test_no_viewport_skips_streaming() {
        let mut sim = sim();
        sim.camera.viewport = None;
        let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
        assert_eq!(report.tiles_spawned, 0);
        assert!(sim.streamer.is_empty());
    }

    #[test]
    fn test_accumulate_sums_counters() {
        let mut total = FrameReport::default();
        let frame = FrameReport {
            frame: 3,
            replans: 2,
            collisions: 1,
            ..FrameReport::default()
        };
        total.accumulate(&frame);
        total.accumulate(&frame);
        assert_eq!(total.replans, 4);
        assert_eq!(total.collisions, 2);
        assert_eq!(total.frame, 3);
    }
}
