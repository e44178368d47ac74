use clap::Parser;
use firecell_core::{
    Blueprint, DirectoryStorage, Engine, Grid, GridBuilder, GridIndex, InMemoryStorage,
    MaterialCatalog, PlanVector, SimulationConfig, SpaceSize, Storage,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Headless room fire simulation
#[derive(Parser, Debug)]
#[command(name = "firecell-headless")]
#[command(about = "Run a room fire simulation without rendering", long_about = None)]
struct Args {
    /// Grid extents X Y Z (Y is vertical); ignored with --blueprint
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [20, 8, 20])]
    size: Vec<i32>,

    /// Last generation to compute
    #[arg(short, long, default_value_t = 100)]
    generations: u64,

    /// Time advanced per generation
    #[arg(short, long, default_value_t = 0.5)]
    delta_time: f64,

    /// Ticks a solid burns before it is exhausted (0 disables combustion)
    #[arg(short, long, default_value_t = 60)]
    max_burning_time: u32,

    /// Write the run parameters and every generation as JSON into this
    /// directory instead of memory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON blueprint describing the initial grid
    #[arg(short, long)]
    blueprint: Option<PathBuf>,

    /// Log statistics every N generations
    #[arg(short, long, default_value_t = 10)]
    report_interval: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let initial = initial_grid(args)?;
    let size = initial.space_size();
    info!("Initial grid {}x{}x{} ({} cells)", size.x, size.y, size.z, initial.len());

    let config = SimulationConfig {
        delta_time: args.delta_time,
        max_burning_time: args.max_burning_time,
        max_generations: Some(args.generations),
    };

    let storage: Arc<dyn Storage> = match &args.output {
        Some(dir) => {
            let directory = DirectoryStorage::new(dir)?;
            directory.initialize(&config, size)?;
            Arc::new(directory)
        }
        None => Arc::new(InMemoryStorage::new()),
    };
    let mut engine = Engine::new(config, MaterialCatalog::standard()?, Arc::clone(&storage))?;
    engine.run(initial)?;
    let report = engine.wait()?;

    let interval = args.report_interval.max(1);
    for generation in (0..report.generations).step_by(interval as usize) {
        match storage.get(generation) {
            Some(grid) => log_stats(generation, &grid),
            None => warn!("Generation {} is not available for reporting", generation),
        }
    }
    log_stats(report.generations - 1, &report.final_grid);

    Ok(())
}

fn initial_grid(args: &Args) -> Result<Grid, Box<dyn Error>> {
    if let Some(path) = &args.blueprint {
        info!("Loading blueprint {}", path.display());
        return Ok(Blueprint::load(path)?.build()?);
    }

    let size = SpaceSize::new(args.size[0], args.size[1], args.size[2]);
    let center = GridIndex::new(size.x / 2 - 1, 0, size.z / 2 - 1);
    let grid = GridBuilder::new(size)
        .room(PlanVector::new(0, 0), size)
        .ignite(center, SpaceSize::new(2, 1, 2))
        .build()?;
    Ok(grid)
}

fn log_stats(generation: u64, grid: &Grid) {
    let stats = grid.stats();
    info!(
        "Generation {:>5}: {:>5} burning, {:>5} burnt out, max {:>6.1} °C, mean {:>6.1} °C, smoke {:>7}, min O2 {:>5.1}",
        generation,
        stats.burning_cells,
        stats.burnt_out_cells,
        stats.max_temperature,
        stats.mean_temperature,
        stats.total_smoke,
        stats.min_oxygen
    );
}
