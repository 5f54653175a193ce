#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use chunk_life::{Coordinate, World, WorldConfig};
use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;

fn seeded_world(config: WorldConfig, size: i64, density: f64) -> World {
    let mut world = World::with_config(config);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xBEEF_CAFE);
    let threshold = (u64::MAX as f64 * density) as u64;

    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                world.activate(Coordinate::new(x, y));
            }
        }
    }
    world
}

fn bench(label: &str, config: WorldConfig, size: i64, density: f64, iterations: u64) {
    let mut world = seeded_world(config, size, density);

    // Warm up: the first generations shed most of the soup.
    world.update_n(2);

    let start = Instant::now();
    world.update_n(iterations);
    let elapsed = start.elapsed();

    let total_ms = elapsed.as_secs_f64() * 1000.0;
    let avg_ms = total_ms / iterations as f64;
    println!(
        "{:<28} {:>6} iters  {:>10.1} ms total  {:>9.3} ms/gen  pop={} chunks={}",
        label,
        iterations,
        total_ms,
        avg_ms,
        world.population(),
        world.chunk_count()
    );
}

fn bench_glider(steps: u64) {
    let mut world = World::with_config(WorldConfig::default().thread_count(1));
    world.activate_all(
        [(1, 0), (2, -1), (0, -2), (1, -2), (2, -2)].map(Coordinate::from),
    );

    world.update_n(2);

    let start = Instant::now();
    world.update_n(steps);
    let elapsed = start.elapsed();

    let total_ms = elapsed.as_secs_f64() * 1000.0;
    let avg_us = total_ms * 1000.0 / steps as f64;
    println!(
        "{:<28} {:>6} iters  {:>10.1} ms total  {:>9.1} us/gen  chunks={}",
        "glider (tiny)",
        steps,
        total_ms,
        avg_us,
        world.chunk_count()
    );
}

fn main() {
    println!("=== chunk-life update benchmark ===\n");

    bench_glider(2000);
    let serial = || WorldConfig::default().thread_count(1);
    bench("64x64 soup, serial", serial(), 64, 0.35, 200);
    bench("256x256 soup, serial", serial(), 256, 0.35, 100);
    bench("256x256 soup, pooled", WorldConfig::default(), 256, 0.35, 100);
    bench("512x512 soup, pooled", WorldConfig::default(), 512, 0.35, 50);
}
