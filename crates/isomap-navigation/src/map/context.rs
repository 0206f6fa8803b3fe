#![warn(missing_docs)]

use isomap_projection::{GridDimensions, IsoProjection, PixelPos, PixelSize, TileCoord, TileSize};
use tracing::info;

use super::{BarrierSet, LayerSource};
use crate::astar::{AStarPathfinder, PathfinderConfig};
use crate::error::{NavigationError, PathError};
use crate::room::RoomIndex;
use crate::viewport::{Granularity, ViewportTracker};

/// Map-wide settings that do not come from the tile layers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapOptions {
    /// Room width along x, in tiles.
    pub room_row: u32,
    /// Room height along y, in tiles.
    pub room_col: u32,
    /// Path search options.
    pub pathfinder: PathfinderConfig,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions { room_row: 50, room_col: 50, pathfinder: PathfinderConfig::default() }
    }
}

/// Everything derived from one loaded map.
///
/// Built once per map load and then only read, so it can be shared behind an
/// `Arc` between tasks.
#[derive(Debug, Clone)]
pub struct MapContext {
    projection: IsoProjection,
    barriers: BarrierSet,
    rooms: RoomIndex,
    pathfinder: PathfinderConfig,
}

impl MapContext {
    /// Builds the context for `source` drawn with `tile`-sized tiles.
    ///
    /// # Errors
    /// * `Projection` if the tile size is not positive.
    /// * `InvalidRoomSize` if a room extent is zero.
    pub fn new<S: LayerSource + ?Sized>(
        source: &S,
        tile: TileSize,
        options: MapOptions,
    ) -> Result<Self, NavigationError> {
        let dims = source.dimensions();
        let projection = IsoProjection::new(dims, tile)?;
        let rooms = RoomIndex::new(dims, options.room_row, options.room_col)?;
        let barriers = BarrierSet::build(source);

        let map_size = projection.map_size();
        info!(
            grid = %dims,
            width_px = map_size.width,
            height_px = map_size.height,
            barriers = barriers.len(),
            rooms = rooms.room_count(),
            "Map loaded"
        );

        Ok(MapContext { projection, barriers, rooms, pathfinder: options.pathfinder })
    }

    /// Rebuilds the barrier index from new layers of the same map.
    ///
    /// # Errors
    /// Returns `Err(NavigationError::InvalidDimensions)` if `source` describes
    /// a grid of a different size.
    pub fn reload<S: LayerSource + ?Sized>(&mut self, source: &S) -> Result<(), NavigationError> {
        if source.dimensions() != self.dims() {
            return Err(NavigationError::InvalidDimensions("Reloaded layers must keep the map size"));
        }
        self.barriers = BarrierSet::build(source);
        info!(barriers = self.barriers.len(), "Barriers rebuilt");
        Ok(())
    }

    /// Grid size.
    pub fn dims(&self) -> GridDimensions {
        self.projection.dims()
    }

    /// Tile/pixel projection.
    pub fn projection(&self) -> &IsoProjection {
        &self.projection
    }

    /// Impassable tiles.
    pub fn barriers(&self) -> &BarrierSet {
        &self.barriers
    }

    /// Room partition.
    pub fn rooms(&self) -> &RoomIndex {
        &self.rooms
    }

    /// A pathfinder over this map's barriers.
    pub fn pathfinder(&self) -> AStarPathfinder<'_> {
        AStarPathfinder::new(&self.barriers, self.pathfinder)
    }

    /// Shortest path from `start` to `end`; see [`AStarPathfinder::find_path`].
    pub fn find_path(&self, start: TileCoord, end: TileCoord) -> Result<Vec<TileCoord>, PathError> {
        self.pathfinder().find_path(start, end)
    }

    /// Pixel centre of `tile`.
    pub fn tile_to_pixel(&self, tile: TileCoord) -> PixelPos {
        self.projection.tile_to_pixel(tile)
    }

    /// Tile under `pixel`; may be outside the grid.
    pub fn pixel_to_tile(&self, pixel: PixelPos) -> TileCoord {
        self.projection.pixel_to_tile(pixel)
    }

    /// Pixel distance between two tile centres.
    pub fn tile_distance(&self, a: TileCoord, b: TileCoord) -> f64 {
        self.projection.tile_distance(a, b)
    }

    /// Waypoints an entity walks through to follow `path`.
    pub fn path_to_pixels(&self, path: &[TileCoord]) -> Vec<PixelPos> {
        path.iter().map(|&t| self.projection.tile_to_pixel(t)).collect()
    }

    /// Room holding `tile`, `-1` outside the grid.
    pub fn room_id(&self, tile: TileCoord) -> i64 {
        self.rooms.room_id(tile)
    }

    /// Clockwise corner tiles of a room.
    pub fn room_vertices(&self, id: i64) -> Option<[TileCoord; 4]> {
        self.rooms.clockwise_vertices(id)
    }

    /// A viewport tracker over this map.
    pub fn tracker(&self, view: PixelSize, granularity: Granularity) -> ViewportTracker {
        ViewportTracker::new(self.projection, view, granularity)
    }
}
