#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use chunk_life::driver::{DEFAULT_FRAMES_PER_SECOND, DEFAULT_TICKS_PER_SECOND};
use chunk_life::error::Result;
use chunk_life::{
    AsciiRenderer, Coordinate, Driver, LifeError, LoopConfig, RenderOptions, SharedWorld, World,
    WorldConfig, logging, pattern, render,
};
use clap::Parser;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

const DEFAULT_SEED: u64 = 0x5EED_1234_ABCD_EF01;

/// Run a chunked Game of Life world from a pattern file or a random soup.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pattern file with one `x, y` line per living cell.
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["random", "preset"])]
    pattern: Option<PathBuf>,
    /// Bundled preset, by `name` or `category/name`. The glider gun is loaded
    /// when no other source is given.
    #[arg(long, value_name = "NAME", conflicts_with = "random")]
    preset: Option<String>,
    /// Directory holding the bundled presets.
    #[arg(long, value_name = "DIR")]
    presets_dir: Option<PathBuf>,
    /// Print the bundled presets and exit.
    #[arg(long)]
    list_presets: bool,
    /// Seed a SIDE x SIDE random soup anchored at the origin.
    #[arg(long, value_name = "SIDE")]
    random: Option<i64>,
    /// Fraction of soup cells that start alive.
    #[arg(long, value_name = "F", default_value_t = 0.35)]
    density: f64,
    /// RNG seed for the soup.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Generations to run.
    #[arg(short, long, value_name = "N", default_value_t = 100)]
    generations: u64,
    /// Generations per second when rendering.
    #[arg(long, value_name = "F", default_value_t = DEFAULT_TICKS_PER_SECOND)]
    tps: f64,
    /// Frames per second when rendering.
    #[arg(long, value_name = "F", default_value_t = DEFAULT_FRAMES_PER_SECOND)]
    fps: f64,
    /// Compute pool size.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    threads: Option<u64>,
    /// Draw the world to stdout on the frame cadence instead of running flat out.
    #[arg(long)]
    render: bool,
    /// Mark cells about to die.
    #[arg(long)]
    colored: bool,
    /// Mark chunk origins.
    #[arg(long)]
    chunk_borders: bool,
    /// Write the final generation to FILE.
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn seed_random_world(world: &mut World, side: i64, density: f64, seed: u64) -> Result<usize> {
    if side <= 0 || !(0.0..=1.0).contains(&density) {
        return Err(LifeError::InvalidConfig(format!(
            "random soup needs SIDE > 0 and density in [0, 1], got {side} and {density}"
        )));
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut seeded = 0usize;
    for y in 0..side {
        for x in 0..side {
            if rng.random_bool(density) {
                world.activate(Coordinate::new(x, y));
                seeded += 1;
            }
        }
    }
    Ok(seeded)
}

fn build_world(cli: &Cli) -> Result<World> {
    let mut config = WorldConfig::default();
    if let Some(n) = cli.threads {
        config = config.thread_count(n as usize);
    }
    let mut world = World::with_config(config);

    if let Some(path) = &cli.pattern {
        pattern::load_file(path, &mut world)?;
    } else if let Some(side) = cli.random {
        let seeded = seed_random_world(&mut world, side, cli.density, cli.seed)?;
        info!(side, density = cli.density, seed = cli.seed, cells = seeded, "random soup seeded");
    } else {
        let name = cli.preset.as_deref().unwrap_or(pattern::DEFAULT_PRESET);
        let dir = cli.presets_dir.clone().unwrap_or_else(pattern::presets_dir);
        pattern::load_preset(&dir, name, &mut world)?;
    }
    Ok(world)
}

fn list_presets() {
    for preset in pattern::PRESETS {
        println!("{}/{}", preset.category, preset.name);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list_presets {
        list_presets();
        return Ok(());
    }
    let world = build_world(&cli)?;
    info!(
        threads = world.thread_count(),
        population = world.population(),
        chunks = world.chunk_count(),
        "world ready"
    );
    let options = RenderOptions::default()
        .colored_cells(cli.colored)
        .chunk_borders(cli.chunk_borders);

    let shared = SharedWorld::new(world);
    let start = Instant::now();
    if cli.render {
        let config = LoopConfig::default()
            .ticks_per_second(cli.tps)
            .frames_per_second(cli.fps)
            .editing(false);
        let mut driver = Driver::new(shared.clone(), config)?;
        let mut renderer = AsciiRenderer::new(io::stdout().lock(), options);
        driver.run(cli.generations, &mut renderer);
    } else {
        shared.write().update_n(cli.generations);
    }
    let elapsed = start.elapsed();

    let world = shared.read();
    let ms_per_gen = if cli.generations == 0 {
        0.0
    } else {
        elapsed.as_secs_f64() * 1000.0 / cli.generations as f64
    };
    info!(
        generation = world.generation(),
        population = world.population(),
        chunks = world.chunk_count(),
        cells = world.cell_count(),
        ms_per_gen,
        "run finished"
    );
    if !cli.render {
        let viewport = render::Viewport::fit(&world, 2);
        if viewport.width <= 120 && viewport.height <= 60 {
            print!("{}", render::render_ascii(&world, viewport, options));
        }
    }

    if let Some(path) = &cli.save {
        pattern::save_file(&world, path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "chunk-life failed");
            ExitCode::FAILURE
        }
    }
}
