mod blackboard; // session state shared between tasks
mod bus; // broadcast topics
mod config; // AppConfig loading
mod session; // camera and view tasks

use std::sync::Arc;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use isomap_navigation::projection::{Gid, GridDimensions, TileCoord};
use isomap_navigation::{LayerSource, MapContext, TileLayers, TiledMap};

use blackboard::{Blackboard, raise_fault, snapshot};
use bus::{CameraEvent, Topic};
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH, load_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(path = %config_path, "Configuration loaded.");

    let ctx = Arc::new(load_map(&cfg)?);
    let bb: Blackboard = Arc::default();

    let (start, goal) = endpoints(&cfg, &ctx).context("Map has no walkable tiles")?;
    let route = match ctx.find_path(start, goal) {
        Ok(route) => route,
        Err(e) => {
            // Keep the session alive with a static camera on the start tile.
            warn!(%start, %goal, "No route for the camera: {}", e);
            raise_fault(&bb, "no camera route");
            vec![start]
        }
    };
    info!(%start, %goal, tiles = route.len(), "Camera route planned.");
    let route = Arc::new(route);

    let topic: Topic<CameraEvent> = Topic::new(cfg.session.topic_capacity);
    let rx = topic.subscribe();
    tokio::try_join!(
        session::camera_task(ctx.clone(), route.clone(), topic.clone(), cfg.session.clone()),
        session::view_task(ctx.clone(), route.clone(), bb.clone(), rx, cfg.view.clone()),
    )?;

    let state = snapshot(&bb);
    info!(
        recomputes = state.recomputes,
        added = state.tiles_added,
        removed = state.tiles_removed,
        visible = state.visible_tiles,
        camera = %state.camera,
        center = ?state.center_tile,
        vertices = ?state.view_vertices,
        route_segments_in_view = state.route_segments_in_view,
        tap = ?state.last_tap,
        tap_area = state.tap_area.len(),
        idle_ms = state.last_update_ts.elapsed().as_millis() as u64,
        preview_rooms = ?state.preview_rooms,
        "Session finished."
    );
    for fault in &state.faults {
        warn!(fault = %fault, "Fault raised during session");
    }
    Ok(())
}

fn load_map(cfg: &AppConfig) -> anyhow::Result<MapContext> {
    match &cfg.map.path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read map file {}", path))?;
            let map = TiledMap::from_json(&json).with_context(|| format!("Failed to parse map file {}", path))?;
            info!(%path, grid = %map.dimensions(), "Loaded Tiled map.");
            MapContext::new(&map, map.tile_size(), cfg.map_options()).context("Failed to build map context")
        }
        None => {
            let dims = GridDimensions::new(cfg.map.row, cfg.map.col).context("Invalid map size in configuration")?;
            let mut rng = StdRng::seed_from_u64(cfg.map.seed);
            let layers = TileLayers::random(dims, cfg.map.obstacles, cfg.map.max_obstacle_size, &mut rng);
            info!(grid = %dims, obstacles = cfg.map.obstacles, seed = cfg.map.seed, "Generated random map.");
            MapContext::new(&layers, cfg.map.tile_size(), cfg.map_options()).context("Failed to build map context")
        }
    }
}

/// Configured endpoints, falling back to the first and last walkable tiles.
fn endpoints(cfg: &AppConfig, ctx: &MapContext) -> Option<(TileCoord, TileCoord)> {
    let dims = ctx.dims();
    let mut walkable = (0..dims.tile_count())
        .map(|gid| dims.gid_to_tile(Gid(gid)))
        .filter(|&tile| !ctx.barriers().is_barrier(tile));
    let first = walkable.next()?;
    let last = walkable.last().unwrap_or(first);
    Some((cfg.session.start().unwrap_or(first), cfg.session.goal().unwrap_or(last)))
}
