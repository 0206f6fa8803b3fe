use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, info, warn};

use isomap_navigation::projection::{PixelPos, TileCoord};
use isomap_navigation::{MapContext, ViewportTracker, diamond_view, segment_in_view};

use crate::blackboard::{Blackboard, raise_fault, touch};
use crate::bus::{CameraEvent, Topic};
use crate::config::{SessionConfig, ViewConfig};

/// Radius, in tiles, of the highlight around a tap.
const TAP_RADIUS: u32 = 1;

/// Moves the camera along `route` at a fixed speed, one event per tick, then
/// taps the destination and stops.
pub async fn camera_task(
    ctx: Arc<MapContext>,
    route: Arc<Vec<TileCoord>>,
    topic: Topic<CameraEvent>,
    cfg: SessionConfig,
) -> anyhow::Result<()> {
    info!(waypoints = route.len(), "Camera task started.");
    let waypoints = ctx.path_to_pixels(&route);
    let Some(&first) = waypoints.first() else {
        topic.publish(CameraEvent::Stop);
        return Ok(());
    };

    let mut ticker = time::interval(Duration::from_millis(cfg.tick_ms.max(1)));
    let speed = cfg.speed_px_per_tick.max(f64::EPSILON);
    let mut position = first;
    ticker.tick().await;
    topic.publish(CameraEvent::Moved(position));

    for &target in &waypoints[1..] {
        loop {
            ticker.tick().await;
            let remaining = position.distance(target);
            if remaining <= speed {
                position = target;
                topic.publish(CameraEvent::Moved(position));
                break;
            }
            position = position.lerp(target, speed / remaining);
            topic.publish(CameraEvent::Moved(position));
        }
    }

    topic.publish(CameraEvent::Tap(position));
    topic.publish(CameraEvent::Stop);
    info!(end = %position, "Camera task finished.");
    Ok(())
}

/// Owns the viewport tracker and records every recomputation on the blackboard.
pub async fn view_task(
    ctx: Arc<MapContext>,
    route: Arc<Vec<TileCoord>>,
    bb: Blackboard,
    mut rx: broadcast::Receiver<Arc<CameraEvent>>,
    cfg: ViewConfig,
) -> anyhow::Result<()> {
    info!("View task started.");
    let mut tracker = ctx.tracker(cfg.size(), cfg.granularity()).with_realtime(cfg.realtime);
    if let Some(preview) = cfg.preview_size() {
        tracker = tracker.with_preview(preview);
    }

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // Only the latest camera position matters.
                warn!("Camera receiver lagged by {} messages in view_task.", n);
                raise_fault(&bb, "camera events dropped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("Camera channel closed without a stop event.");
                break;
            }
        };

        match *event {
            CameraEvent::Moved(center) => on_camera_moved(&ctx, &route, &bb, &mut tracker, center),
            CameraEvent::Tap(pixel) => on_tap(&ctx, &bb, pixel),
            CameraEvent::Stop => break,
        }
    }

    info!("View task finished.");
    Ok(())
}

fn on_camera_moved(
    ctx: &MapContext,
    route: &[TileCoord],
    bb: &Blackboard,
    tracker: &mut ViewportTracker,
    center: PixelPos,
) {
    bb.write().camera = center;
    let Some(delta) = tracker.update(center) else {
        return;
    };
    let (added, removed) = (delta.added.len() as u64, delta.removed.len() as u64);
    let Some(snapshot) = tracker.snapshot() else {
        return;
    };

    let route_segments_in_view = route
        .windows(2)
        .filter(|w| segment_in_view(snapshot, w[0], w[1]))
        .count();
    let preview_rooms = tracker
        .preview_vertices()
        .map(|v| ctx.rooms().rooms_touching(&v))
        .unwrap_or_default();

    {
        let mut g = bb.write();
        g.center_tile = tracker.center_tile();
        g.view_vertices = Some(snapshot.vertices);
        g.visible_tiles = snapshot.len();
        g.recomputes += 1;
        g.tiles_added += added;
        g.tiles_removed += removed;
        g.route_segments_in_view = route_segments_in_view;
        g.preview_rooms = preview_rooms;
    }
    touch(bb);
    debug!(visible = snapshot.len(), added, removed, route_segments_in_view, "View updated");
}

fn on_tap(ctx: &MapContext, bb: &Blackboard, pixel: PixelPos) {
    let tile = ctx.pixel_to_tile(pixel);
    if !ctx.dims().contains(tile) {
        warn!(%pixel, %tile, "Tap outside the map ignored");
        return;
    }
    let room = ctx.room_id(tile);
    let area = diamond_view(ctx.dims(), tile, TAP_RADIUS);
    info!(%tile, room, highlighted = area.len(), "Tap");

    let mut g = bb.write();
    g.last_tap = Some((tile, room));
    g.tap_area = area;
}
