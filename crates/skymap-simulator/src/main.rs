//! SkyMap Simulator CLI
//!
//! Runs the air-traffic simulation and logs what happens on every tick.

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use skymap_domain::CanvasSize;
use skymap_simulator::config::LogFormat;
use skymap_simulator::{
    SimulationClock, SimulationConfig, SpawnPolicy, SpeedMultiplier, TickReport, TrafficEngine,
    TrafficModel, Viewport, airports, project_model,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skymap-simulator")]
#[command(about = "Simulate air traffic between European airports")]
struct Args {
    /// Canvas width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Speed multiplier (1-100)
    #[arg(short, long)]
    speed: Option<u32>,

    /// Number of ticks to run
    #[arg(short, long, default_value = "300")]
    ticks: u64,

    /// CSV airport table (code,name,longitude,latitude,altitude)
    #[arg(long)]
    airports: Option<PathBuf>,

    /// Maximum number of simultaneous flights
    #[arg(long)]
    max_flights: Option<usize>,

    /// How the spawn probability scales with tick length
    #[arg(long, value_enum)]
    spawn_policy: Option<SpawnPolicy>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Advance as fast as possible instead of following the wall clock
    #[arg(long)]
    headless: bool,

    /// Print the final snapshot and its layout as JSON
    #[arg(long)]
    json: bool,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Command-line flags win over environment configuration.
    fn apply(&self, config: &mut SimulationConfig) {
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(path) = &self.airports {
            config.airports_path = Some(path.clone());
        }
        if let Some(max) = self.max_flights {
            config.rules.max_flights = max;
        }
        if let Some(policy) = self.spawn_policy {
            config.rules.spawn_policy = policy;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = SimulationConfig::from_env();
    args.apply(&mut config);

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skymap_simulator={}", config.log_level)));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    let airport_table = match &config.airports_path {
        Some(path) => airports::load_csv(path)?,
        None => airports::builtin(),
    };

    let mut engine = match args.seed {
        Some(seed) => TrafficEngine::seeded(config.rules, config.generation, seed),
        None => TrafficEngine::new(config.rules, config.generation),
    };
    let canvas = CanvasSize::new(config.canvas_width, config.canvas_height);
    let initial = engine.generate_model(canvas, airport_table)?;
    let speed = SpeedMultiplier::new(config.speed)?;

    info!(
        "Starting simulation: {} airports, {} flights, {}x speed",
        initial.airports.len(),
        initial.flights.len(),
        speed.get()
    );
    info!(
        "Canvas: {}x{}, Ticks: {}, Spawn: {:.0}% {:?}",
        canvas.width,
        canvas.height,
        args.ticks,
        config.rules.spawn_probability * 100.0,
        config.rules.spawn_policy
    );

    let final_model = if args.headless {
        run_headless(engine, initial, speed, args.ticks)
    } else {
        run_clocked(engine, initial, speed, args.ticks).await?
    };

    info!("Simulation complete!");
    log_traffic(&final_model);

    if args.json {
        let layout = project_model(&final_model, &Viewport::default());
        let output = json!({
            "model": final_model,
            "layout": layout,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

/// Advance in a tight loop, one simulated tick after another.
fn run_headless(
    mut engine: TrafficEngine,
    mut model: TrafficModel,
    speed: SpeedMultiplier,
    ticks: u64,
) -> TrafficModel {
    let elapsed_ms = speed.elapsed_per_tick_ms();
    for tick in 1..=ticks {
        let (next, report) = engine.step(&model, elapsed_ms);
        model = next;
        log_tick(tick, ticks, &model, &report);
    }
    model
}

/// Follow the wall clock until `ticks` frames have been produced.
async fn run_clocked(
    engine: TrafficEngine,
    initial: TrafficModel,
    speed: SpeedMultiplier,
    ticks: u64,
) -> Result<TrafficModel> {
    let handle = SimulationClock::new(engine, speed).start(initial);
    let mut frames = handle.subscribe();

    while frames.changed().await.is_ok() {
        let frame = frames.borrow_and_update().clone();
        log_tick(frame.tick, ticks, &frame.model, &frame.report);
        if frame.tick >= ticks {
            break;
        }
    }

    Ok(handle.stop().await?)
}

fn log_tick(tick: u64, total: u64, model: &TrafficModel, report: &TickReport) {
    info!(
        "Tick {}/{} | Flights: {} | Arrived: {} | Spawned: {}",
        tick,
        total,
        model.flights.len(),
        report.arrived.len(),
        report.spawned.as_ref().map_or("-", |id| id.as_str())
    );
    for id in &report.arrived {
        info!("  {} landed", id);
    }

    // Show active traffic periodically
    if tick % 30 == 0 {
        log_traffic(model);
    }
}

fn log_traffic(model: &TrafficModel) {
    if model.flights.is_empty() {
        warn!("No active flights");
        return;
    }
    info!("--- ACTIVE TRAFFIC ---");
    for flight in &model.flights {
        info!(
            "  {} {} -> {} | {:.3}, {:.3} | {:.2} deg to go",
            flight.id,
            flight.departure.code,
            flight.arrival.code,
            flight.position.latitude,
            flight.position.longitude,
            flight.remaining_distance()
        );
    }
}
