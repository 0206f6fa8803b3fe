use isomap_navigation::projection::{GridDimensions, TileCoord, TileSize};
use isomap_navigation::{MapContext, MapOptions, PathfinderConfig, TileLayers};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .init();

    // 24x16 map with random rectangular obstacles
    let dims = GridDimensions::new(24, 16)?;
    let mut rng = StdRng::seed_from_u64(2024);
    let mut layers = TileLayers::random(dims, 30, 3, &mut rng);

    let start = TileCoord::new(0, 0);
    let goal = TileCoord::new(23, 15);
    layers.set_barrier(start, false);
    layers.set_barrier(goal, false);

    for eight_directional in [false, true] {
        let options = MapOptions {
            pathfinder: PathfinderConfig { eight_directional, max_iterations: Some(10_000) },
            ..MapOptions::default()
        };
        let ctx = MapContext::new(&layers, TileSize::new(64.0, 32.0), options)?;

        println!("\n{} search from {} to {}", if eight_directional { "8-way" } else { "4-way" }, start, goal);
        match ctx.find_path(start, goal) {
            Ok(path) => {
                println!("Path of {} tiles", path.len());
                let on_path: HashSet<TileCoord> = path.iter().copied().collect();
                print_grid(&ctx, start, goal, &on_path);
            }
            Err(e) => {
                println!("{}", e);
                print_grid(&ctx, start, goal, &HashSet::new());
            }
        }
    }
    Ok(())
}

fn print_grid(ctx: &MapContext, start: TileCoord, goal: TileCoord, path: &HashSet<TileCoord>) {
    let dims = ctx.dims();
    // One printed row per y, x runs left to right.
    for y in 0..dims.col as i32 {
        for x in 0..dims.row as i32 {
            let tile = TileCoord::new(x, y);
            if tile == start {
                print!("S ");
            } else if tile == goal {
                print!("G ");
            } else if path.contains(&tile) {
                print!("* ");
            } else if ctx.barriers().is_barrier(tile) {
                print!("X ");
            } else {
                print!(". ");
            }
        }
        println!();
    }
}
