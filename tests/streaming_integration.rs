//! Integration tests for camera-driven tile streaming

use ahash::AHashSet;
use overworld::core::config::SimulationConfig;
use overworld::core::types::{TileCoord, Vector2};
use overworld::movement::steering::SteeringIntent;
use overworld::render::camera::{Camera, Viewport};
use overworld::render::streamer::{NullPresenter, RenderArea, TilePresenter, WorldStreamer};
use overworld::simulation::{run_frame, Simulation};
use overworld::world::grid::WorldGrid;
use overworld::world::tile::Tile;

/// Presenter tracking which tiles are currently shown
#[derive(Default)]
struct Stage {
    shown: AHashSet<TileCoord>,
    double_spawns: usize,
    unknown_destroys: usize,
}

impl TilePresenter for Stage {
    fn instantiate(&mut self, tile: &Tile) {
        if !self.shown.insert(tile.coord) {
            self.double_spawns += 1;
        }
    }

    fn destroy(&mut self, tile: &Tile) {
        if !self.shown.remove(&tile.coord) {
            self.unknown_destroys += 1;
        }
    }
}

fn expected_coords(area: RenderArea, world: &WorldGrid) -> AHashSet<TileCoord> {
    area.coords().filter(|&c| world.contains(c)).collect()
}

#[test]
fn test_registry_tracks_moving_camera() {
    let world = WorldGrid::open(60, 40);
    let mut camera = Camera::new(4.0);
    camera.set_viewport(Viewport::new(480.0, 320.0, 32.0));
    let mut streamer = WorldStreamer::new();
    let mut stage = Stage::default();

    let waypoints = [
        Vector2::new(0.0, 0.0),
        Vector2::new(30.0, 20.0),
        Vector2::new(59.0, 39.0),
        Vector2::new(59.0, 0.0),
        Vector2::new(10.0, 30.0),
    ];

    for target in waypoints {
        for _ in 0..120 {
            camera.pursue(target, 1.0 / 60.0);
            let viewport = camera.viewport.unwrap();
            let area = RenderArea::around(camera.position, &viewport, 2);
            streamer.update_render_area(area, Some(&world), &mut stage);

            let live: AHashSet<TileCoord> = streamer.live_coords().collect();
            assert_eq!(live, expected_coords(area, &world));
            assert_eq!(stage.shown, live);
        }
    }

    assert_eq!(stage.double_spawns, 0);
    assert_eq!(stage.unknown_destroys, 0);
}

#[test]
fn test_live_set_is_bounded_by_area() {
    let world = WorldGrid::open(200, 200);
    let viewport = Viewport::new(640.0, 480.0, 32.0);
    let mut streamer = WorldStreamer::new();

    for step in 0..100 {
        let center = Vector2::new(20.0 + step as f32 * 1.5, 100.0);
        let area = RenderArea::around(center, &viewport, 2);
        streamer.update_render_area(area, Some(&world), &mut NullPresenter);
        let span = ((area.end.x - area.start.x + 1) * (area.end.y - area.start.y + 1)) as usize;
        assert!(streamer.len() <= span);
    }
}

#[test]
fn test_simulation_streams_around_player() {
    let mut sim = Simulation::new(SimulationConfig::default(), WorldGrid::open(80, 80), TileCoord::new(40, 40)).unwrap();
    let mut stage = Stage::default();
    let down = SteeringIntent::new(false, false, false, true);

    for _ in 0..180 {
        run_frame(&mut sim, 1.0 / 60.0, down, &mut stage);
    }

    let area = sim.streamer.area().unwrap();
    let player_tile = sim.player().unwrap().position.tile();
    assert!(area.contains(player_tile));
    assert_eq!(stage.shown.len(), sim.streamer.len());
    assert_eq!(stage.double_spawns, 0);
}

#[test]
fn test_viewport_resize_changes_area() {
    let mut sim = Simulation::new(SimulationConfig::default(), WorldGrid::open(100, 100), TileCoord::new(50, 50)).unwrap();
    run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
    let before = sim.streamer.len();

    sim.camera.set_viewport(Viewport::new(320.0, 240.0, 48.0));
    let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);

    assert!(report.tiles_evicted > 0);
    assert_eq!(report.tiles_spawned, 0);
    assert!(sim.streamer.len() < before);
}

#[test]
fn test_zero_tile_size_keeps_streaming() {
    let mut sim = Simulation::new(SimulationConfig::default(), WorldGrid::open(30, 20), TileCoord::new(15, 10)).unwrap();
    run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
    let area = sim.streamer.area();

    assert!(!sim.camera.set_viewport(Viewport::new(800.0, 600.0, 0.0)));
    let report = run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
    assert_eq!(report.tiles_spawned, 0);
    assert_eq!(sim.streamer.area(), area);

    // Bypassing validation still streams, bounded by the world
    sim.camera.viewport = Some(Viewport::new(800.0, 600.0, 0.0));
    run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut NullPresenter);
    assert_eq!(sim.streamer.len(), 30 * 20);
}

#[test]
fn test_tiny_tile_size_streams_whole_world() {
    let mut sim = Simulation::new(SimulationConfig::default(), WorldGrid::open(50, 50), TileCoord::new(25, 25)).unwrap();
    assert!(sim.camera.set_viewport(Viewport::new(800.0, 600.0, 1e-6)));
    let mut stage = Stage::default();

    run_frame(&mut sim, 1.0 / 60.0, SteeringIntent::IDLE, &mut stage);

    assert_eq!(sim.streamer.len(), 50 * 50);
    assert_eq!(stage.shown.len(), 50 * 50);
    assert_eq!(stage.double_spawns, 0);
}

#[test]
fn test_pointer_maps_to_world_tiles() {
    let mut camera = Camera::new(4.0);
    camera.set_viewport(Viewport::new(800.0, 600.0, 50.0));
    camera.move_to(Vector2::new(10.0, 10.0));

    // One tile right and two down of the screen centre
    let tile = camera.screen_to_tiles(glam::Vec2::new(450.0, 400.0)).unwrap();
    assert_eq!(tile.tile(), TileCoord::new(11, 12));
}
