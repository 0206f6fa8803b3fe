use isomap_navigation::projection::{GridDimensions, PixelPos, PixelSize, TileCoord, TileSize};
use isomap_navigation::{CornerFlag, Granularity, MapContext, MapOptions, TileLayers};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dims = GridDimensions::new(30, 30)?;
    let ctx = MapContext::new(&TileLayers::open(dims), TileSize::new(64.0, 32.0), MapOptions::default())?;

    let view = PixelSize::new(384.0, 192.0);
    let mut tracker = ctx.tracker(view, Granularity::Tile).with_preview(view.scale(6.0, 3.0));

    // Pan the camera to the right along the map's horizontal axis
    for step in 0..4 {
        let center = PixelPos::new(step as f64 * 48.0, 0.0);
        let Some(delta) = tracker.update(center) else {
            println!("\nCamera at {}: same tile, view unchanged", center);
            continue;
        };
        println!(
            "\nCamera at {}: +{} tiles, -{} tiles",
            center,
            delta.added.len(),
            delta.removed.len()
        );

        if let Some(snapshot) = tracker.snapshot() {
            println!("Vertices: {:?}", snapshot.vertices.map(|v| (v.x, v.y)));
            let flags: HashMap<TileCoord, CornerFlag> =
                snapshot.tiles.iter().map(|t| (t.coord, t.corner)).collect();
            for y in 0..dims.col as i32 {
                for x in 0..dims.row as i32 {
                    match flags.get(&TileCoord::new(x, y)) {
                        Some(CornerFlag::Corner) => print!("C "),
                        Some(CornerFlag::Plain) => print!("# "),
                        None => print!(". "),
                    }
                }
                println!();
            }
        }
        if let Some(preview) = tracker.preview_vertices() {
            println!("Preview rooms: {:?}", ctx.rooms().rooms_touching(&preview));
        }
    }
    Ok(())
}
