//! Simulation state shared by every per-frame system

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::error::{OverworldError, Result};
use crate::core::types::{EntityId, TileCoord};
use crate::movement::entity::MovingEntity;
use crate::navigation::pathfinding::random_free_tile;
use crate::render::camera::Camera;
use crate::render::streamer::WorldStreamer;
use crate::spatial::collidable::Collidable;
use crate::world::grid::WorldGrid;

/// Attempts per agent when looking for a clear random spawn
const SPAWN_ATTEMPTS: usize = 64;

/// Everything one simulation owns
///
/// The world grid is read-only after construction. Entities are only added
/// between frames.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub world: WorldGrid,
    pub entities: Vec<MovingEntity>,
    pub player: EntityId,
    pub camera: Camera,
    pub streamer: WorldStreamer,
    pub frame: u64,
    pub elapsed: f32,
    pub(crate) rng: ChaCha8Rng,
    next_id: u32,
}

impl Simulation {
    /// Simulation with only the player, standing on `player_tile`
    ///
    /// The tile must be free and the player's hitbox must not touch rock.
    pub fn new(config: SimulationConfig, world: WorldGrid, player_tile: TileCoord) -> Result<Self> {
        config.validate()?;
        if !world.contains(player_tile) || world.is_blocked(player_tile) {
            return Err(OverworldError::InvalidSpawn(player_tile));
        }

        let player_id = EntityId::new(0);
        let player = MovingEntity::player(player_id, player_tile, &config.movement);
        if !clear_of_rock(&world, &player) {
            return Err(OverworldError::InvalidSpawn(player_tile));
        }

        let mut camera = Camera::from_config(&config.camera);
        camera.move_to(player.position);

        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        tracing::debug!("player {} spawned on {}", player_id, player_tile);

        Ok(Self {
            config,
            world,
            entities: vec![player],
            player: player_id,
            camera,
            streamer: WorldStreamer::new(),
            frame: 0,
            elapsed: 0.0,
            rng,
            next_id: 1,
        })
    }

    /// Generate a seeded map from the world section of `config`, then place the
    /// player and `agent_count` agents on clear random tiles
    pub fn generate(config: SimulationConfig) -> Result<Self> {
        let mut map_rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = WorldGrid::generate(
            config.world.width,
            config.world.height,
            config.world.rock_density,
            &mut map_rng,
        );
        Self::populated(config, world)
    }

    /// Place the player and `agent_count` agents on clear random tiles of
    /// `world`
    pub fn populated(config: SimulationConfig, world: WorldGrid) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let player_tile = (0..SPAWN_ATTEMPTS)
            .filter_map(|_| random_free_tile(&world, &mut rng))
            .find(|&tile| {
                let candidate = MovingEntity::player(EntityId::new(0), tile, &config.movement);
                clear_of_rock(&world, &candidate)
            })
            .ok_or_else(|| OverworldError::InvalidGrid("no clear tile for the player".to_string()))?;

        let agent_count = config.world.agent_count;
        let mut simulation = Self::new(config, world, player_tile)?;
        let spawned = simulation.populate(agent_count);
        if spawned < agent_count {
            tracing::warn!("only {} of {} agents found room to spawn", spawned, agent_count);
        }
        Ok(simulation)
    }

    /// Add an agent standing on `tile` and give it a random objective
    ///
    /// Fails with `InvalidSpawn` when the tile is off the map or blocked, or
    /// when the agent's hitbox would overlap rock or another entity.
    pub fn spawn_agent(&mut self, tile: TileCoord) -> Result<EntityId> {
        if !self.world.contains(tile) || self.world.is_blocked(tile) {
            return Err(OverworldError::InvalidSpawn(tile));
        }
        let id = EntityId::new(self.next_id);
        let agent = MovingEntity::agent(id, tile, &self.config.movement, &self.config.navigation);
        if !clear_of_rock(&self.world, &agent) || self.overlaps_entity(&agent) {
            return Err(OverworldError::InvalidSpawn(tile));
        }
        Ok(self.insert_agent(agent))
    }

    /// Spawn up to `count` agents on random tiles where they overlap neither
    /// rock nor another entity; returns how many were placed
    pub fn populate(&mut self, count: usize) -> usize {
        let mut placed = 0;
        for _ in 0..count {
            let id = EntityId::new(self.next_id);
            let mut spawned = false;
            for _ in 0..SPAWN_ATTEMPTS {
                let Some(tile) = random_free_tile(&self.world, &mut self.rng) else {
                    return placed;
                };
                let agent = MovingEntity::agent(id, tile, &self.config.movement, &self.config.navigation);
                if clear_of_rock(&self.world, &agent) && !self.overlaps_entity(&agent) {
                    self.insert_agent(agent);
                    spawned = true;
                    break;
                }
            }
            if !spawned {
                break;
            }
            placed += 1;
        }
        placed
    }

    fn insert_agent(&mut self, mut agent: MovingEntity) -> EntityId {
        let id = agent.id;
        let objective = random_free_tile(&self.world, &mut self.rng);
        if let Some(follower) = agent.follower_mut() {
            follower.set_objective(objective);
        }
        tracing::debug!("agent {} spawned on {} heading to {:?}", id, agent.tile(), objective);
        self.entities.push(agent);
        self.next_id += 1;
        id
    }

    fn overlaps_entity(&self, candidate: &MovingEntity) -> bool {
        let bounds = candidate.bounds();
        self.entities.iter().any(|e| e.bounds().intersects(&bounds))
    }

    pub fn entity(&self, id: EntityId) -> Result<&MovingEntity> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .ok_or(OverworldError::EntityNotFound(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut MovingEntity> {
        self.entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(OverworldError::EntityNotFound(id))
    }

    pub fn player(&self) -> Result<&MovingEntity> {
        self.entity(self.player)
    }

    /// Replace an agent's objective; `None` leaves it idle until the next
    /// frame picks one
    pub fn set_objective(&mut self, id: EntityId, objective: Option<TileCoord>) -> Result<()> {
        let entity = self.entity_mut(id)?;
        match entity.follower_mut() {
            Some(follower) => {
                follower.set_objective(objective);
                Ok(())
            }
            None => Err(OverworldError::InvalidConfig(format!("{} does not follow paths", id))),
        }
    }

    pub fn agents(&self) -> impl Iterator<Item = &MovingEntity> {
        self.entities.iter().filter(|e| !e.is_player_controlled())
    }
}

/// True when no rock tile overlaps the entity's hitbox
pub(crate) fn clear_of_rock(world: &WorldGrid, entity: &MovingEntity) -> bool {
    let bounds = entity.bounds();
    world
        .solid_tiles_near(&bounds)
        .iter()
        .all(|tile| !tile.bounds().intersects(&bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_sim() -> Simulation {
        Simulation::new(SimulationConfig::default(), WorldGrid::open(20, 20), TileCoord::new(10, 10)).unwrap()
    }

    #[test]
    fn test_player_spawn_is_validated() {
        let world = WorldGrid::from_ascii(
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap();
        let config = SimulationConfig::default();
        assert!(matches!(
            Simulation::new(config.clone(), world.clone(), TileCoord::new(1, 1)),
            Err(OverworldError::InvalidSpawn(_))
        ));
        assert!(matches!(
            Simulation::new(config, world, TileCoord::new(7, 0)),
            Err(OverworldError::InvalidSpawn(_))
        ));
    }

    #[test]
    fn test_player_hitbox_next_to_rock_is_rejected() {
        // Tile (1, 1) is free but the player's hitbox reaches into (0, 1)
        let world = WorldGrid::from_ascii(
            "
            .....
            #....
            .....
            ",
        )
        .unwrap();
        assert!(matches!(
            Simulation::new(SimulationConfig::default(), world.clone(), TileCoord::new(1, 1)),
            Err(OverworldError::InvalidSpawn(tile)) if tile == TileCoord::new(1, 1)
        ));
        assert!(Simulation::new(SimulationConfig::default(), world, TileCoord::new(3, 1)).is_ok());
    }

    #[test]
    fn test_agent_below_rock_is_rejected() {
        // The agent's hitbox sits mostly in the tile above its spawn tile
        let world = WorldGrid::from_ascii(
            "
            .....
            ..#..
            .....
            .....
            ",
        )
        .unwrap();
        let mut sim = Simulation::new(SimulationConfig::default(), world, TileCoord::new(4, 3)).unwrap();

        assert!(matches!(
            sim.spawn_agent(TileCoord::new(2, 2)),
            Err(OverworldError::InvalidSpawn(tile)) if tile == TileCoord::new(2, 2)
        ));
        assert_eq!(sim.agents().count(), 0);

        let id = sim.spawn_agent(TileCoord::new(0, 2)).unwrap();
        assert!(clear_of_rock(&sim.world, sim.entity(id).unwrap()));
    }

    #[test]
    fn test_agent_on_another_entity_is_rejected() {
        let mut sim = open_sim();
        assert!(matches!(
            sim.spawn_agent(TileCoord::new(10, 10)),
            Err(OverworldError::InvalidSpawn(_))
        ));

        sim.spawn_agent(TileCoord::new(3, 3)).unwrap();
        assert!(matches!(
            sim.spawn_agent(TileCoord::new(3, 3)),
            Err(OverworldError::InvalidSpawn(_))
        ));
        assert_eq!(sim.agents().count(), 1);
        assert_eq!(sim.spawn_agent(TileCoord::new(6, 3)).unwrap(), EntityId::new(2));
    }

    #[test]
    fn test_camera_starts_on_player() {
        let sim = open_sim();
        assert_eq!(sim.camera.position, sim.player().unwrap().position);
    }

    #[test]
    fn test_spawned_agents_get_objectives() {
        let mut sim = open_sim();
        let id = sim.spawn_agent(TileCoord::new(2, 2)).unwrap();
        assert_eq!(id, EntityId::new(1));
        let agent = sim.entity(id).unwrap();
        assert!(agent.follower().and_then(|f| f.objective()).is_some());
    }

    #[test]
    fn test_populate_avoids_overlap() {
        let mut sim = open_sim();
        assert_eq!(sim.populate(10), 10);
        assert_eq!(sim.agents().count(), 10);
        for (i, a) in sim.entities.iter().enumerate() {
            for b in &sim.entities[i + 1..] {
                assert!(!a.bounds().intersects(&b.bounds()), "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn test_unknown_entity() {
        let sim = open_sim();
        assert!(matches!(
            sim.entity(EntityId::new(99)),
            Err(OverworldError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_player_has_no_objective() {
        let mut sim = open_sim();
        let player = sim.player;
        assert!(sim.set_objective(player, Some(TileCoord::new(1, 1))).is_err());
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = Simulation::generate(SimulationConfig::default()).unwrap();
        let b = Simulation::generate(SimulationConfig::default()).unwrap();
        assert_eq!(a.world, b.world);
        assert_eq!(a.entities, b.entities);
        assert_eq!(a.agents().count(), 4);
    }
}
