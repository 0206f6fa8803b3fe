//! Navigation and visibility over isometric tile maps.
//!
//! Barrier indexing, A* pathfinding, viewport tracking and the room index,
//! tied together by [`MapContext`].

pub mod astar;
pub mod error;
pub mod map;
pub mod queue;
pub mod room;
pub mod viewport;

pub use astar::{AStarPathfinder, PathNode, PathfinderConfig, STEP};
pub use error::{NavigationError, PathError};
pub use map::{BarrierSet, LayerKind, LayerSource, MapContext, MapOptions, TileLayers};
#[cfg(feature = "serde")]
pub use map::TiledMap;
pub use queue::PriorityQueue;
pub use room::RoomIndex;
pub use viewport::{
    CornerFlag, Granularity, ViewDelta, ViewSnapshot, ViewportTracker, VisibleTile, diamond_view, diff,
    segment_in_view, view_vertices, visible_tiles,
};

pub use isomap_projection as projection;
