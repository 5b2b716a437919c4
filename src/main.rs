//! Headless Overworld Runner
//!
//! Runs the frame loop with a scripted player walking a square and prints a
//! summary of what the systems did.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use overworld::core::config::SimulationConfig;
use overworld::core::error::Result;
use overworld::movement::steering::SteeringIntent;
use overworld::render::streamer::NullPresenter;
use overworld::simulation::{run_frame, FrameReport, Simulation};
use overworld::world::grid::WorldGrid;

/// Seconds the scripted player walks in one direction before turning
const LEG_SECONDS: f32 = 2.0;

/// Headless runner for the overworld core
#[derive(Parser, Debug)]
#[command(name = "overworld")]
#[command(about = "Run the movement, navigation and streaming core without a renderer")]
struct Args {
    /// Simulated seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// ASCII map file ('.' free, '#' rock); a map is generated otherwise
    #[arg(long)]
    map: Option<PathBuf>,

    /// Generated map width in tiles
    #[arg(long)]
    width: Option<usize>,

    /// Generated map height in tiles
    #[arg(long)]
    height: Option<usize>,

    /// Fraction of generated tiles that are rock
    #[arg(long)]
    rock_density: Option<f32>,

    /// Number of autonomous agents
    #[arg(long)]
    agents: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    seconds: f32,
    world_width: usize,
    world_height: usize,
    agents: usize,
    live_tiles: usize,
    totals: FrameReport,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("overworld=info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let seed = config.seed;

    let mut sim = match &args.map {
        Some(path) => {
            let world = WorldGrid::from_ascii(&fs::read_to_string(path)?)?;
            Simulation::populated(config, world)?
        }
        None => Simulation::generate(config)?,
    };

    tracing::info!(
        "Overworld starting: {}x{} tiles, {} agents, seed {}",
        sim.world.width(),
        sim.world.height(),
        sim.agents().count(),
        seed
    );

    let fps = args.fps.max(1);
    let dt = 1.0 / fps as f32;
    let frames = (args.seconds.max(0.0) * fps as f32).round() as u64;

    let mut totals = FrameReport::default();
    let mut presenter = NullPresenter;
    for frame in 0..frames {
        let intent = scripted_intent(frame as f32 * dt);
        let report = run_frame(&mut sim, dt, intent, &mut presenter);
        totals.accumulate(&report);
    }

    let summary = RunSummary {
        seed,
        frames,
        seconds: sim.elapsed,
        world_width: sim.world.width(),
        world_height: sim.world.height(),
        agents: sim.agents().count(),
        live_tiles: sim.streamer.len(),
        totals,
    };

    tracing::info!(
        "Overworld finished: {} frames, {} replans, {} failed plans, {} collisions",
        summary.frames,
        totals.replans,
        totals.failed_plans,
        totals.collisions
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.world.width = width;
    }
    if let Some(height) = args.height {
        config.world.height = height;
    }
    if let Some(density) = args.rock_density {
        config.world.rock_density = density;
    }
    if let Some(agents) = args.agents {
        config.world.agent_count = agents;
    }

    config.validate()?;
    Ok(config)
}

/// Walk right, down, left, up, one leg at a time
fn scripted_intent(elapsed: f32) -> SteeringIntent {
    match (elapsed / LEG_SECONDS) as u32 % 4 {
        0 => SteeringIntent::new(false, true, false, false),
        1 => SteeringIntent::new(false, false, false, true),
        2 => SteeringIntent::new(true, false, false, false),
        _ => SteeringIntent::new(false, false, true, false),
    }
}

fn print_summary(summary: &RunSummary) {
    let totals = &summary.totals;
    println!("\n=== OVERWORLD ===");
    println!("Seed:        {}", summary.seed);
    println!("World:       {}x{}", summary.world_width, summary.world_height);
    println!("Agents:      {}", summary.agents);
    println!("Frames:      {} ({:.2}s)", summary.frames, summary.seconds);
    println!();
    println!("Replans:     {}", totals.replans);
    println!("Failed:      {}", totals.failed_plans);
    println!("Objectives:  {}", totals.objectives_assigned);
    println!("Collisions:  {}", totals.collisions);
    println!(
        "Tiles:       {} spawned, {} evicted, {} live",
        totals.tiles_spawned, totals.tiles_evicted, summary.live_tiles
    );
    println!(
        "Player:      ({:.2}, {:.2})",
        totals.player_position.x, totals.player_position.y
    );
    println!(
        "Camera:      ({:.2}, {:.2})",
        totals.camera_position.x, totals.camera_position.y
    );
}
