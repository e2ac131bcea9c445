#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates labyrinths and runs pursuit simulations.

mod config;
mod render;
mod simulate;

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use labyrinth_system_generation::{generate, PartitionTree};
use labyrinth_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::CliConfig,
    render::{render, Markers},
    simulate::Simulation,
};

#[derive(Debug, Parser)]
#[command(
    name = "labyrinth",
    version,
    about = "Seeded BSP labyrinths and the agents that roam them"
)]
struct Cli {
    /// Log filter directive, e.g. `debug` or `labyrinth_system_generation=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generates a labyrinth and prints it as text.
    Generate(GenerationArgs),
    /// Generates a labyrinth and lets pursuers chase a wandering target.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
struct GenerationArgs {
    /// TOML file with `[generation]`, `[costs]`, `[spawning]` and `[agents]` tables.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for the generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of cell columns.
    #[arg(long)]
    width: Option<u32>,
    /// Number of cell rows.
    #[arg(long)]
    height: Option<u32>,
    /// Number of split levels below the root.
    #[arg(long)]
    depth: Option<u32>,
    /// Smallest room width.
    #[arg(long)]
    min_room_width: Option<u32>,
    /// Smallest room height.
    #[arg(long)]
    min_room_height: Option<u32>,
    /// Probability that a partition joins the extra-corridor pool.
    #[arg(long)]
    extra_corridor_chance: Option<f64>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    generation: GenerationArgs,
    /// Maximum number of ticks to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Probability that a walkable cell receives a power-up.
    #[arg(long)]
    powerup_chance: Option<f64>,
    /// Milliseconds a collected power-up shields the target.
    #[arg(long)]
    invulnerability_ms: Option<u64>,
}

impl GenerationArgs {
    fn resolve(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;
        let generation = &mut config.generation;
        if let Some(seed) = self.seed {
            generation.seed = seed;
        }
        if let Some(width) = self.width {
            generation.width = width;
        }
        if let Some(height) = self.height {
            generation.height = height;
        }
        if let Some(depth) = self.depth {
            generation.max_depth = depth;
        }
        if let Some(width) = self.min_room_width {
            generation.min_room_width = width;
        }
        if let Some(height) = self.min_room_height {
            generation.min_room_height = height;
        }
        if let Some(chance) = self.extra_corridor_chance {
            generation.extra_corridor_chance = chance;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Simulate(args) => run_simulate(&args),
    }
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn run_generate(args: &GenerationArgs) -> Result<()> {
    let config = args.resolve()?;
    config.validate()?;

    let generated = generate(&config.generation)?;
    let view = query::labyrinth_view(&generated.world)
        .context("labyrinth generation did not complete")?;
    let report = generated.report;
    let anchor = generated.tree[PartitionTree::ROOT].anchor();
    let connected = query::reachability(&generated.world, anchor)
        .map_or(0, |field| field.reached());
    info!(seed = config.generation.seed, "labyrinth generated");

    print!("{}", render(&view, &Markers::default()));
    println!(
        "seed {:#x}: {} partitions, {} rooms, {} tree corridors, {} extra corridors",
        config.generation.seed,
        report.partitions,
        report.rooms,
        report.tree_corridors,
        report.extra_corridors
    );
    println!(
        "{} walkable cells, {} connected to the centre",
        view.walkable().len(),
        connected
    );
    if report.abandoned_splits > 0 || report.fallback_rooms > 0 {
        println!(
            "{} abandoned splits, {} rooms placed by fallback",
            report.abandoned_splits, report.fallback_rooms
        );
    }
    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let mut config = args.generation.resolve()?;
    if let Some(chance) = args.powerup_chance {
        config.spawning.powerup_chance = chance;
    }
    if let Some(duration) = args.invulnerability_ms {
        config.spawning.invulnerability_ms = duration;
    }
    config.validate()?;

    let generated = generate(&config.generation)?;
    let simulation = Simulation::new(&generated, &config)?;
    let report = simulation.run(args.ticks, Duration::from_millis(args.tick_ms))?;

    print!("{}", report.final_frame);
    match &report.capture {
        Some(capture) => println!(
            "{} ({}) caught the target at ({}, {}) on tick {}",
            capture.agent,
            capture.policy,
            capture.cell.x(),
            capture.cell.y(),
            capture.tick
        ),
        None => println!(
            "target evaded for {} ticks and ended at ({}, {})",
            report.ticks,
            report.target.x(),
            report.target.y()
        ),
    }
    println!(
        "power-ups collected: {}, pursuers repelled: {}",
        report.powerups_collected, report.pursuers_repelled
    );
    Ok(())
}
